//! The engine that turns wrapped lines into glyph placements.

use serde::{Deserialize, Serialize};

use crate::config::PageGeometry;
use crate::fonts::Font;
use crate::layout::constants::{SPACE, SPACE_RATIO};
use crate::layout::wrap::WrappedLine;
use crate::layout::{GlyphPlacement, Transform};
use crate::units::Mm;

/// What happens when the cursor goes past the bottom of the page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Go back to the top of the page and keep writing over what is there.
    Recycle,

    /// Go back to the top of the page and drop the remaining lines.
    Truncate,
}

impl Default for Overflow {
    fn default() -> Overflow {
        Overflow::Recycle
    }
}

/// The result of laying out some lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Laidout<'a> {
    /// The glyphs to draw, in writing order.
    pub placements: Vec<GlyphPlacement<'a>>,

    /// Where the next line should be written.
    pub cursor: Mm,

    /// The number of lines that were laid out.
    pub lines: usize,

    /// Whether the cursor went back to the top of the page.
    pub wrapped_around: bool,

    /// The number of lines dropped because the page was full.
    pub dropped_lines: usize,
}

/// Lays out lines of text on a page.
pub struct Layout<'a> {
    font: &'a Font,
    page: &'a PageGeometry,
    overflow: Overflow,
}

impl<'a> Layout<'a> {
    /// Creates a new layout engine.
    pub fn new(font: &'a Font, page: &'a PageGeometry, overflow: Overflow) -> Layout<'a> {
        Layout {
            font,
            page,
            overflow,
        }
    }

    /// Returns the cursor to start from, and whether it had to go back to
    /// the top of the page.
    pub fn start(&self, cursor: Mm) -> (Mm, bool) {
        if !cursor.is_finite() || cursor < self.page.start_y() {
            (self.page.start_y(), false)
        } else if cursor > self.page.bottom() {
            (self.page.start_y(), true)
        } else {
            (cursor, false)
        }
    }

    /// Lays out the lines, the first one at `cursor`.
    pub fn layout(&self, lines: &[WrappedLine], cursor: Mm) -> Laidout<'a> {
        let (mut y, mut wrapped_around) = self.start(cursor);
        let mut placements = vec![];
        let mut laid_out = 0;
        let mut dropped_lines = 0;

        for (index, line) in lines.iter().enumerate() {
            self.write_line(&line.text(), y, &mut placements);
            laid_out += 1;

            y += self.page.line_height();

            if y > self.page.bottom() {
                wrapped_around = true;
                y = self.page.start_y();

                if self.overflow == Overflow::Truncate {
                    dropped_lines = lines.len() - index - 1;
                    if dropped_lines > 0 {
                        warn!("page is full, dropping {} lines", dropped_lines);
                    }
                    break;
                }

                debug!("page is full, going back to the top");
            }
        }

        Laidout {
            placements,
            cursor: y,
            lines: laid_out,
            wrapped_around,
            dropped_lines,
        }
    }

    /// Places the glyphs of a line whose top is at `y`.
    fn write_line(&self, text: &str, y: Mm, placements: &mut Vec<GlyphPlacement<'a>>) {
        let metrics = self.font.metrics();
        let scale = metrics.scale(self.page.text_height);
        let space_width = self.page.text_height * SPACE_RATIO;
        let mut x = self.page.start_x();

        for c in text.chars() {
            if c == SPACE {
                x += space_width;
                continue;
            }

            let glyph = match self.font.glyph(c) {
                Some(glyph) => glyph,
                None => {
                    trace!("no glyph for {:?}, skipping it", c);
                    continue;
                }
            };

            placements.push(GlyphPlacement {
                c,
                glyph,
                transform: Transform::glyph(scale, metrics.ascent, x, y),
            });

            x += Mm(glyph.advance_width * scale);
        }
    }
}
