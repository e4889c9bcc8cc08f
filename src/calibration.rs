//! The calibration record and the math that produces and consumes it.
//!
//! Calibration measures pixel density (pixels per inch) against an object of
//! known physical width, photographed at a known distance. Under the pinhole
//! approximation apparent size shrinks linearly with distance, so the density
//! is only meaningful *at* that distance; the record carries the reference
//! distance alongside the density, and measurement rescales the density to
//! the user's current distance estimate before converting a pixel span to
//! inches.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geom::{pixel_distance, MarkerPosition};
use crate::units::{Inches, Pixels};

/// Short-edge width of an ISO/IEC 7810 ID-1 card, the default reference
/// object.
pub const CARD_WIDTH: Inches = Inches(3.375);

/// Distance at which the reference object is photographed by default.
pub const DEFAULT_REFERENCE_DISTANCE: Inches = Inches(36.0);

/// The known-size object a calibration is taken against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    /// Physical width of the reference object.
    pub width: Inches,
    /// Distance from the camera at which it is photographed.
    pub distance: Inches,
}

impl Default for ReferenceTarget {
    fn default() -> Self {
        Self {
            width: CARD_WIDTH,
            distance: DEFAULT_REFERENCE_DISTANCE,
        }
    }
}

impl ReferenceTarget {
    /// Validate and create a reference target.
    pub fn new(width: Inches, distance: Inches) -> Result<Self, CalibrationError> {
        if !width.is_positive() {
            return Err(CalibrationError::InvalidReferenceWidth { width: width.get() });
        }
        if !distance.is_positive() {
            return Err(CalibrationError::InvalidReferenceDistance {
                distance: distance.get(),
            });
        }
        Ok(Self { width, distance })
    }
}

/// Calibration validation and construction errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("reference width must be finite and > 0, got {width}")]
    InvalidReferenceWidth { width: f64 },
    #[error("reference distance must be finite and > 0, got {distance}")]
    InvalidReferenceDistance { distance: f64 },
    #[error("marker coordinates must be finite")]
    NonFiniteMarker,
    #[error("calibration markers coincide; pixel density would be zero")]
    DegenerateMarkers,
    #[error("pixels per inch must be finite and > 0, got {pixels_per_inch}")]
    InvalidPixelsPerInch { pixels_per_inch: f64 },
}

/// The sole persisted entity: pixel density tied to the distance at which it
/// was measured.
///
/// Invariant: both fields are finite and strictly positive. The constructors
/// enforce this, so a held `CalibrationRecord` is always usable; records
/// deserialized from storage must pass [`CalibrationRecord::validate`] before
/// use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    /// Pixel density measured at `reference_distance`.
    pub pixels_per_inch: f64,
    /// Distance-to-subject at which the calibration markers were placed.
    #[serde(rename = "calibrationDistance")]
    pub reference_distance: Inches,
}

impl CalibrationRecord {
    /// Create a record from already-measured values, checking the invariant.
    pub fn new(pixels_per_inch: f64, reference_distance: Inches) -> Result<Self, CalibrationError> {
        let record = Self {
            pixels_per_inch,
            reference_distance,
        };
        record.validate()?;
        Ok(record)
    }

    /// Compute a calibration from two markers placed on the visible ends of
    /// `reference`.
    ///
    /// Rejects non-finite marker coordinates and coincident markers: a zero
    /// pixel span would yield a zero density and every later measurement
    /// would divide by it.
    pub fn from_markers(
        p1: MarkerPosition,
        p2: MarkerPosition,
        reference: &ReferenceTarget,
    ) -> Result<Self, CalibrationError> {
        if !p1.is_finite() || !p2.is_finite() {
            return Err(CalibrationError::NonFiniteMarker);
        }
        let span = pixel_distance(p1, p2);
        if span.get() == 0.0 {
            return Err(CalibrationError::DegenerateMarkers);
        }
        let record = Self::new(span.get() / reference.width.get(), reference.distance)?;
        debug!(
            "calibrated: {} over {} -> {:.3} px/in at {}",
            span, reference.width, record.pixels_per_inch, record.reference_distance
        );
        Ok(record)
    }

    /// Check the record invariant. Call this on records loaded from storage.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !(self.pixels_per_inch.is_finite() && self.pixels_per_inch > 0.0) {
            return Err(CalibrationError::InvalidPixelsPerInch {
                pixels_per_inch: self.pixels_per_inch,
            });
        }
        if !self.reference_distance.is_positive() {
            return Err(CalibrationError::InvalidReferenceDistance {
                distance: self.reference_distance.get(),
            });
        }
        Ok(())
    }

    /// Pixel density rescaled from the reference distance to the user's
    /// current distance estimate.
    ///
    /// Similar-triangles model: an object twice as far away spans half as
    /// many pixels per inch, so the density scales by
    /// `reference_distance / user_distance`.
    #[inline]
    pub fn adjusted_pixels_per_inch(&self, user_distance: Inches) -> f64 {
        self.pixels_per_inch * (self.reference_distance.get() / user_distance.get())
    }

    /// Convert an on-screen pixel span to a physical length at the user's
    /// estimated distance.
    ///
    /// A zero span converts to exactly zero inches (the "no measurement yet"
    /// state). No rounding is applied; display formatting is the caller's
    /// concern.
    #[inline]
    pub fn span_inches(&self, span: Pixels, user_distance: Inches) -> Inches {
        Inches(span.get() / self.adjusted_pixels_per_inch(user_distance))
    }
}
