//! Dimension units used by writerbuddy.
//!
//! Every length on the page is expressed in millimeters: the output document
//! uses a viewport whose user unit is one millimeter, so that a page of
//! 210 × 297 mm has a `0 0 210 297` view box.
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, Neg, Sub, SubAssign};
use std::{f64, fmt};

use serde::{Deserialize, Serialize};

/// Millimeters.
#[derive(Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Mm(pub f64);

impl Mm {
    /// Returns whether the measure is a finite number.
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Returns the larger of two measures.
    pub fn max(self, other: Mm) -> Mm {
        Mm(self.0.max(other.0))
    }
}

impl fmt::Debug for Mm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} mm", self.0)
    }
}

impl fmt::Display for Mm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}mm", self.0)
    }
}

macro_rules! impl_operators {
    ($the_type: ty, $constructor: expr) => {
        impl Add for $the_type {
            type Output = $the_type;

            fn add(self, other: $the_type) -> $the_type {
                $constructor(self.0 + other.0)
            }
        }

        impl AddAssign for $the_type {
            fn add_assign(&mut self, other: $the_type) {
                self.0 += other.0;
            }
        }

        impl Sub for $the_type {
            type Output = $the_type;

            fn sub(self, other: $the_type) -> $the_type {
                $constructor(self.0 - other.0)
            }
        }

        impl SubAssign for $the_type {
            fn sub_assign(&mut self, other: $the_type) {
                self.0 -= other.0;
            }
        }

        impl Mul<f64> for $the_type {
            type Output = $the_type;

            fn mul(self, rhs: f64) -> $the_type {
                $constructor(self.0 * rhs)
            }
        }

        impl Div<f64> for $the_type {
            type Output = $the_type;

            fn div(self, rhs: f64) -> $the_type {
                $constructor(self.0 / rhs)
            }
        }

        impl DivAssign<f64> for $the_type {
            fn div_assign(&mut self, rhs: f64) {
                self.0 /= rhs;
            }
        }

        impl Neg for $the_type {
            type Output = $the_type;

            fn neg(self) -> $the_type {
                $constructor(-self.0)
            }
        }

        impl PartialOrd for $the_type {
            fn partial_cmp(&self, other: &$the_type) -> Option<Ordering> {
                self.0.partial_cmp(&other.0)
            }
        }
    };
}

impl_operators!(Mm, Mm);

/// Compares two float numbers to check if they're close enough to be
/// considered equal.
///
/// # Examples
///
/// ```
/// # use writerbuddy::units::nearly_equal;
/// assert_eq!(nearly_equal(3.0, 2.99999), true);
/// assert_eq!(nearly_equal(4.0, 3.999), false);
/// ```
pub fn nearly_equal(a: f64, b: f64) -> bool {
    let abs_a = a.abs();
    let abs_b = b.abs();
    let diff = (a - b).abs();

    if a == b {
        // Handle infinities.
        true
    } else if a == 0.0 || b == 0.0 || diff < f64::MIN_POSITIVE {
        // One of a or b is zero (or both are extremely close to it,) use absolute error.
        diff < (f64::EPSILON * f64::MIN_POSITIVE)
    } else {
        // Use relative error.
        (diff / f64::min(abs_a + abs_b, f64::MAX)) < 10e-5
    }
}
