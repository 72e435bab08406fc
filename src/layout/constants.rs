//! Various constants used for laying out the glyphs of a page.

/// The width of a space, relative to the text height.
///
/// The space glyph of the font, if any, is never used.
pub const SPACE_RATIO: f64 = 0.6;

/// The char that separates two words on a line.
pub const SPACE: char = ' ';
