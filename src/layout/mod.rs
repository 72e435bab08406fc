//! This module places glyphs on the page.

pub mod constants;
pub mod engine;
pub mod wrap;

use std::fmt;

use crate::fonts::Glyph;
use crate::units::Mm;

/// An affine transform made of a scale and a translation, which is all we
/// need to move a glyph from design units to the page.
///
/// It maps `(x, y)` to `(a * x + e, d * y + f)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    /// The horizontal scale.
    pub a: f64,

    /// The vertical scale.
    pub d: f64,

    /// The horizontal translation.
    pub e: Mm,

    /// The vertical translation.
    pub f: Mm,
}

impl Transform {
    /// Creates the transform of a glyph whose origin is at `x`, on the line
    /// whose top is at `y`.
    ///
    /// Design units have their y axis going up while the page has its y axis
    /// going down, hence the flip.
    pub fn glyph(scale: f64, ascent: f64, x: Mm, y: Mm) -> Transform {
        Transform {
            a: scale,
            d: -scale,
            e: x,
            f: y + Mm(ascent * scale),
        }
    }

    /// Applies the transform to a point in design units.
    pub fn apply(&self, x: f64, y: f64) -> (Mm, Mm) {
        (Mm(self.a * x) + self.e, Mm(self.d * y) + self.f)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "matrix({} 0 0 {} {} {})",
            self.a, self.d, self.e.0, self.f.0
        )
    }
}

/// A glyph that is ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement<'a> {
    /// The char the glyph represents.
    pub c: char,

    /// The glyph of the font.
    pub glyph: &'a Glyph,

    /// Where the glyph goes on the page.
    pub transform: Transform,
}
