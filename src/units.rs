//! Unit newtypes for the two length domains the crate mixes.
//!
//! Pixel spans and physical lengths are both `f64` underneath, which is
//! exactly how unit-confusion bugs happen. The newtypes keep the two apart at
//! every public boundary; conversion between them only happens inside the
//! calibration math.

use serde::{Deserialize, Serialize};

/// A length measured in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pixels(pub f64);

/// A physical length in inches.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl Pixels {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// True when the value is finite (neither NaN nor infinite).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Inches {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// True for a finite, strictly positive length. Distances and reference
    /// widths must pass this before they reach the calibration math.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl std::fmt::Display for Pixels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}

impl std::fmt::Display for Inches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}in", self.0)
    }
}
