//! This module contains everything that helps us dealing with fonts.
//!
//! Fonts are svg fonts: every glyph is a single stroke path, which is exactly
//! what a pen plotter can draw.

pub mod error;
pub mod parser;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::fonts::error::{FontErrorKind, FontLoadError};
use crate::fonts::parser::elements;
use crate::units::Mm;

/// The embedded stroke font, used when a project has no font of its own.
pub const BUILTIN_FONT: &str = include_str!("../../assets/fonts/strokes.svg");

/// A glyph of a font.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// The path data of the glyph, in design units.
    pub outline: String,

    /// The horizontal advance of the glyph, in design units.
    pub advance_width: f64,
}

/// The global metrics of a font.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontMetrics {
    /// The number of design units in an em.
    pub units_per_em: f64,

    /// The height of the font above the baseline, in design units.
    pub ascent: f64,

    /// The advance of glyphs that don't specify theirs, in design units.
    pub default_advance_width: f64,
}

impl FontMetrics {
    /// Returns the factor converting design units to millimeters for a text height.
    pub fn scale(&self, text_height: Mm) -> f64 {
        text_height.0 / self.units_per_em
    }
}

/// A font that maps chars to their glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// The glyphs of the font.
    glyphs: HashMap<char, Glyph>,

    /// The metrics of the font.
    metrics: FontMetrics,
}

impl Font {
    /// Creates a font from glyphs and metrics.
    pub fn new(glyphs: HashMap<char, Glyph>, metrics: FontMetrics) -> Font {
        Font { glyphs, metrics }
    }

    /// Loads an svg font from a path to a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Font, FontLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FontLoadError::new(FontErrorKind::Unreadable(e)).with_path(path))?;

        let font = Font::parse(&content).map_err(|e| e.with_path(path))?;
        info!(
            "loaded {} glyphs from \"{}\"",
            font.glyphs.len(),
            path.display()
        );

        Ok(font)
    }

    /// Returns the font embedded into the crate.
    pub fn builtin() -> Result<Font, FontLoadError> {
        Font::parse(BUILTIN_FONT)
    }

    /// Loads an svg font from its content.
    pub fn parse(content: &str) -> Result<Font, FontLoadError> {
        let elements = elements(content)?;

        // The font face holds the metrics, while the font holds the default advance.
        let font_face = elements
            .iter()
            .find(|e| e.name == "font-face")
            .ok_or_else(|| FontLoadError::new(FontErrorKind::MissingElement("font-face")))?;

        let font = elements
            .iter()
            .find(|e| e.name == "font")
            .ok_or_else(|| FontLoadError::new(FontErrorKind::MissingElement("font")))?;

        let units_per_em = font_face.number("units-per-em", 1000.0, content)?;
        if units_per_em <= 0.0 {
            return Err(FontLoadError::located(
                FontErrorKind::InvalidUnitsPerEm(units_per_em),
                content,
                font_face.position,
            ));
        }

        let metrics = FontMetrics {
            units_per_em,
            ascent: font_face.number("ascent", units_per_em, content)?,
            default_advance_width: font.number("horiz-adv-x", units_per_em, content)?,
        };

        let mut glyphs = HashMap::new();

        for element in elements.iter().filter(|e| e.name == "glyph") {
            let mut chars = element.attribute("unicode").unwrap_or("").chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    debug!(
                        "skipping glyph at line {} without a single char mapping",
                        element.position.line
                    );
                    continue;
                }
            };

            let outline = match element.attribute("d") {
                Some(d) if !d.trim().is_empty() => d.to_owned(),
                _ => {
                    debug!("skipping glyph {:?} without outline", c);
                    continue;
                }
            };

            let advance_width =
                element.number("horiz-adv-x", metrics.default_advance_width, content)?;

            if glyphs.insert(c, Glyph { outline, advance_width }).is_some() {
                debug!("glyph {:?} is defined twice, keeping the last one", c);
            }
        }

        Ok(Font { glyphs, metrics })
    }

    /// Returns the glyph of a char if the font has one.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Returns the metrics of the font.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Returns the number of glyphs in the font.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns whether the font has no glyph at all.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Computes the width of a char of the font at a specified text height.
    ///
    /// Chars without glyph have no width.
    pub fn char_width(&self, c: char, text_height: Mm) -> Mm {
        match self.glyph(c) {
            Some(glyph) => Mm(glyph.advance_width * self.metrics.scale(text_height)),
            None => Mm(0.0),
        }
    }

    /// Computes the text width of the font at a specified text height.
    pub fn text_width(&self, text: &str, text_height: Mm) -> Mm {
        let scale = self.metrics.scale(text_height);
        let sum_width = text
            .chars()
            .filter_map(|c| self.glyph(c))
            .fold(0.0, |acc, glyph| acc + glyph.advance_width);

        Mm(sum_width * scale)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::fonts::error::FontErrorKind;
    use crate::fonts::Font;
    use crate::tests::HI_FONT;
    use crate::units::{nearly_equal, Mm};

    #[test]
    fn reads_metrics_and_glyphs() {
        let font = Font::parse(HI_FONT).unwrap();

        assert_eq!(font.metrics().units_per_em, 1000.0);
        assert_eq!(font.metrics().ascent, 800.0);
        assert_eq!(font.metrics().default_advance_width, 600.0);

        assert_eq!(font.glyph('H').map(|g| g.advance_width), Some(500.0));
        assert_eq!(font.glyph('i').map(|g| g.advance_width), Some(200.0));
        assert_eq!(
            font.glyph('H').map(|g| g.outline.as_str()),
            Some("M 0 0 L 0 700 M 400 0 L 400 700 M 0 350 L 400 350")
        );
    }

    #[test]
    fn glyph_without_advance_uses_the_default() {
        let font = Font::parse(HI_FONT).unwrap();
        assert_eq!(font.glyph('o').map(|g| g.advance_width), Some(600.0));
    }

    #[test]
    fn unusable_glyphs_are_skipped() {
        let font = Font::parse(HI_FONT).unwrap();

        // Ligature, missing unicode and missing outline.
        assert!(font.glyph('f').is_none());
        assert!(font.glyph(' ').is_none());
        assert_eq!(font.len(), 4);
    }

    #[test]
    fn ampersand_glyph_is_unescaped() {
        let font = Font::parse(HI_FONT).unwrap();
        assert!(font.glyph('&').is_some());
    }

    #[test]
    fn truncated_font_is_an_error() {
        let truncated = &HI_FONT[..HI_FONT.find("<glyph unicode=\"o\"").unwrap()];
        let error = Font::parse(truncated).unwrap_err();
        assert!(matches!(error.kind, FontErrorKind::Malformed));
    }

    #[test]
    fn badly_nested_font_is_an_error() {
        let content = r#"<svg><font horiz-adv-x="500"><font-face/><glyph unicode="a" d="M0 0"/></svg></font>"#;
        let error = Font::parse(content).unwrap_err();
        assert!(matches!(error.kind, FontErrorKind::Malformed));
    }

    #[test]
    fn missing_font_face_is_an_error() {
        let error = Font::parse(r#"<svg><font horiz-adv-x="500"></font></svg>"#).unwrap_err();
        assert!(matches!(
            error.kind,
            FontErrorKind::MissingElement("font-face")
        ));
    }

    #[test]
    fn missing_font_is_an_error() {
        let error = Font::parse(r#"<svg><font-face units-per-em="1000"/></svg>"#).unwrap_err();
        assert!(matches!(error.kind, FontErrorKind::MissingElement("font")));
    }

    #[test]
    fn non_positive_units_per_em_is_an_error() {
        let content = r#"<font><font-face units-per-em="0"/></font>"#;
        let error = Font::parse(content).unwrap_err();
        assert!(matches!(error.kind, FontErrorKind::InvalidUnitsPerEm(_)));
    }

    #[test]
    fn invalid_glyph_advance_is_an_error() {
        let content = r#"<font><font-face/><glyph unicode="a" d="M0 0" horiz-adv-x="x"/></font>"#;
        let error = Font::parse(content).unwrap_err();
        assert!(matches!(error.kind, FontErrorKind::InvalidNumber { .. }));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.svg");
        let error = Font::from_file(&path).unwrap_err();
        assert!(matches!(error.kind, FontErrorKind::Unreadable(_)));
        assert_eq!(error.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn loading_twice_gives_the_same_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hi.svg");
        fs::write(&path, HI_FONT).unwrap();

        let first = Font::from_file(&path).unwrap();
        let second = Font::from_file(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn text_width_ignores_unmapped_chars() {
        let font = Font::parse(HI_FONT).unwrap();
        let text_height = Mm(6.0);

        assert!(nearly_equal(font.text_width("Hi", text_height).0, 4.2));
        assert!(nearly_equal(font.text_width("H#i", text_height).0, 4.2));
        assert!(nearly_equal(font.char_width('H', text_height).0, 3.0));
        assert_eq!(font.char_width('#', text_height), Mm(0.0));
    }

    #[test]
    fn builtin_font_covers_letters_and_digits() {
        let font = Font::builtin().unwrap();
        for c in ('A'..='Z').chain('a'..='z').chain('0'..='9') {
            assert!(font.glyph(c).is_some(), "missing glyph {:?}", c);
        }
    }
}
