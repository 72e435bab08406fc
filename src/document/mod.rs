//! This module writes the glyphs of a page into an svg document.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::PageGeometry;
use crate::fonts::parser::escape;
use crate::layout::{GlyphPlacement, Transform};
use crate::units::Mm;
use crate::{Error, Result};

/// A path of the document.
#[derive(Debug, Clone, PartialEq)]
struct Stroke {
    /// The path data, in design units.
    outline: String,

    /// Where the path goes on the page.
    transform: Transform,
}

/// This struct contains the svg document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The size of the page.
    page_size: (Mm, Mm),

    /// The width of the strokes.
    stroke_width: Mm,

    /// The strokes to draw, in order.
    strokes: Vec<Stroke>,
}

impl Document {
    /// Creates an empty document for a page.
    pub fn new(page: &PageGeometry) -> Document {
        Document {
            page_size: (page.width, page.height),
            stroke_width: page.stroke_width,
            strokes: vec![],
        }
    }

    /// Adds a glyph to the document.
    pub fn push(&mut self, placement: &GlyphPlacement) {
        self.strokes.push(Stroke {
            outline: placement.glyph.outline.clone(),
            transform: placement.transform,
        });
    }

    /// Adds many glyphs to the document.
    pub fn extend<'a, 'b, I>(&mut self, placements: I)
    where
        'a: 'b,
        I: IntoIterator<Item = &'b GlyphPlacement<'a>>,
    {
        for placement in placements {
            self.push(placement);
        }
    }

    /// Returns the number of paths of the document.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Returns whether the document has no path.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Writes the document.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let (width, height) = self.page_size;

        writeln!(writer, r#"<?xml version="1.0" encoding="utf-8" ?>"#)?;
        writeln!(
            writer,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.2" baseProfile="tiny" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            width, height, width.0, height.0
        )?;
        writeln!(
            writer,
            r#"<g id="text_group" fill="none" stroke="black" stroke-linecap="round" stroke-linejoin="round" stroke-width="{}">"#,
            self.stroke_width.0
        )?;

        for stroke in &self.strokes {
            writeln!(
                writer,
                r#"<path d="{}" transform="{}" />"#,
                escape(&stroke.outline),
                stroke.transform
            )?;
        }

        writeln!(writer, "</g>")?;
        writeln!(writer, "</svg>")?;
        Ok(())
    }

    /// Renders the document into a string.
    pub fn render(&self) -> String {
        let mut buffer = vec![];

        // Writing into memory cannot fail.
        self.write_to(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Saves the document into a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let error = |e: io::Error| Error::DocumentWriteError(path.to_owned(), e);

        let file = File::create(path).map_err(error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(error)?;
        writer.flush().map_err(error)?;

        info!("saved {} paths to \"{}\"", self.len(), path.display());
        Ok(())
    }
}
