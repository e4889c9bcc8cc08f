//! Marker positions and the pixel-space segment math.
//!
//! Everything here is pure and total over the reals: non-finite coordinates
//! propagate NaN through the results rather than erroring, and it is the
//! session layer's job to keep such values away from the user.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::units::Pixels;

/// A marker the user has placed on screen, in the pixel coordinate space of
/// the camera preview. Ephemeral: lives only for the duration of a
/// calibration or measurement session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub x: f64,
    pub y: f64,
}

impl MarkerPosition {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn point(self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// True when both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for MarkerPosition {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two markers, in pixels.
///
/// Always >= 0 for finite input, and exactly 0 only when the markers
/// coincide. Never errors.
#[inline]
pub fn pixel_distance(p1: MarkerPosition, p2: MarkerPosition) -> Pixels {
    Pixels((p2.point() - p1.point()).norm())
}

/// Midpoint of the segment between two markers, for placing an on-screen
/// annotation label.
#[inline]
pub fn segment_midpoint(p1: MarkerPosition, p2: MarkerPosition) -> MarkerPosition {
    MarkerPosition::new((p1.x + p2.x) * 0.5, (p1.y + p2.y) * 0.5)
}

/// Screen-space angle of the segment from `p1` to `p2`, in degrees.
///
/// Matches `atan2(dy, dx)`: 0 for a horizontal segment pointing right,
/// positive downward in the usual image coordinate convention.
#[inline]
pub fn segment_angle_deg(p1: MarkerPosition, p2: MarkerPosition) -> f64 {
    let d: Vector2<f64> = p2.point() - p1.point();
    d.y.atan2(d.x).to_degrees()
}
