//! Turns texts into a document, continuing where the previous write stopped.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::document::Document;
use crate::fonts::Font;
use crate::layout::engine::Layout;
use crate::layout::wrap::{chunk_words, wrap_all, WrappedLine};
use crate::state::CursorStore;
use crate::units::Mm;
use crate::Result;

/// What a write did.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The path of the generated document.
    pub output: PathBuf,

    /// The number of lines written.
    pub lines: usize,

    /// The number of glyphs drawn.
    pub placements: usize,

    /// The cursor that was saved for the next write.
    pub cursor: Mm,

    /// Whether the text reached the bottom of the page.
    pub wrapped_around: bool,

    /// The number of lines that didn't fit on the page.
    pub dropped_lines: usize,
}

/// Writes texts with the font and page of a configuration.
pub struct Writer<'a> {
    config: &'a Config,
    font: Font,
}

impl<'a> Writer<'a> {
    /// Creates a writer, loading the font of the configuration.
    pub fn new(config: &'a Config) -> Result<Writer<'a>> {
        let font = Font::from_file(config.font_path())?;
        Ok(Writer::with_font(config, font))
    }

    /// Creates a writer using an already loaded font.
    pub fn with_font(config: &'a Config, font: Font) -> Writer<'a> {
        Writer { config, font }
    }

    /// Returns the font of the writer.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Wraps the texts into the lines that will be written.
    pub fn wrap<S: AsRef<str>>(&self, texts: &[S]) -> Vec<WrappedLine> {
        let chunks: Vec<String> = texts
            .iter()
            .flat_map(|text| chunk_words(text.as_ref(), self.config.max_words))
            .collect();

        let page = &self.config.page;
        wrap_all(&chunks, &self.font, page.text_height, page.max_line_width)
    }

    /// Writes the texts into the document at `output`.
    ///
    /// The cursor is only saved once the document is written, so that a
    /// failed write leaves the store as it was.
    pub fn write<S: AsRef<str>, P: AsRef<Path>>(
        &self,
        texts: &[S],
        output: P,
        store: &mut dyn CursorStore,
    ) -> Result<Report> {
        let output = output.as_ref();
        let page = &self.config.page;

        let lines = self.wrap(texts);
        let cursor = store.load();
        debug!("writing {} lines from {:?}", lines.len(), cursor);

        let laidout = Layout::new(&self.font, page, self.config.overflow).layout(&lines, cursor);

        let mut document = Document::new(page);
        document.extend(&laidout.placements);
        document.save(output)?;

        store.save(laidout.cursor)?;

        if laidout.wrapped_around {
            info!("reached the bottom of the page, next line goes back to the top");
        }

        Ok(Report {
            output: output.to_owned(),
            lines: laidout.lines,
            placements: laidout.placements.len(),
            cursor: laidout.cursor,
            wrapped_around: laidout.wrapped_around,
            dropped_lines: laidout.dropped_lines,
        })
    }
}
