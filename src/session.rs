//! Measurement session: the workflow boundary around the pure conversion
//! math.
//!
//! A session is constructed from a validated [`CalibrationRecord`] and owns
//! the live inputs the host UI feeds it: up to two markers and the user's
//! current distance estimate. [`MeasurementSession::measurement`] is cheap
//! and deterministic, intended to be re-invoked on every marker drag and
//! every slider change; until both markers are placed it returns `None`
//! rather than a number.
//!
//! The record is immutable for the lifetime of the session. After a
//! recalibration the host starts a fresh session instead of mutating this
//! one.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationError, CalibrationRecord};
use crate::geom::{pixel_distance, segment_angle_deg, segment_midpoint, MarkerPosition};
use crate::store::{CalibrationStore, StoreError};
use crate::units::{Inches, Pixels};

/// Lower bound of the distance slider. UI policy, not a law of the math.
pub const MIN_USER_DISTANCE: Inches = Inches(12.0);
/// Upper bound of the distance slider.
pub const MAX_USER_DISTANCE: Inches = Inches(96.0);
/// Slider position for a fresh session.
pub const DEFAULT_USER_DISTANCE: Inches = Inches(36.0);

/// Clamp a distance estimate into the slider range.
pub fn clamp_user_distance(distance: Inches) -> Inches {
    Inches(distance.get().clamp(MIN_USER_DISTANCE.get(), MAX_USER_DISTANCE.get()))
}

/// Which of the two on-screen markers to move.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSlot {
    First,
    Second,
}

/// Where the session currently stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Fewer than two markers placed; no measurement is produced.
    MarkersIncomplete,
    /// Both markers placed; `measurement()` returns a value.
    Ready,
}

/// Session-level errors. The pure math below never errors; everything that
/// can go wrong goes wrong here, at the boundary.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("no calibration record stored; run calibration first")]
    MissingCalibration,
    #[error("stored calibration record is invalid: {0}")]
    InvalidCalibration(#[from] CalibrationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("user distance must be finite and > 0, got {distance}")]
    InvalidDistance { distance: f64 },
    #[error("marker coordinates must be finite")]
    NonFiniteMarker,
}

/// One recomputation of the live measurement, with the annotation geometry a
/// host UI needs to draw the segment and its label. Transient; never
/// persisted by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Raw on-screen span between the markers.
    pub span: Pixels,
    /// Estimated physical length at the current distance estimate.
    pub length: Inches,
    /// Segment midpoint, for label placement.
    pub midpoint: MarkerPosition,
    /// Segment angle in degrees, for label rotation.
    pub angle_deg: f64,
}

/// Live measurement state for one subject.
#[derive(Clone, Debug)]
pub struct MeasurementSession {
    record: CalibrationRecord,
    markers: [Option<MarkerPosition>; 2],
    user_distance: Inches,
}

impl MeasurementSession {
    /// Start a session from a calibration record. The record is re-validated
    /// so a session can never hold an unusable one.
    pub fn new(record: CalibrationRecord) -> Result<Self, SessionError> {
        record.validate()?;
        Ok(Self {
            record,
            markers: [None, None],
            user_distance: DEFAULT_USER_DISTANCE,
        })
    }

    /// Load the stored calibration record and start a session from it.
    ///
    /// The record is read once; recalibrating mid-session has no effect on an
    /// already-running session.
    pub fn from_store<S: CalibrationStore>(store: &S) -> Result<Self, SessionError> {
        let record = store.load()?.ok_or(SessionError::MissingCalibration)?;
        debug!(
            "session started: {:.3} px/in at {}",
            record.pixels_per_inch, record.reference_distance
        );
        Self::new(record)
    }

    /// The record this session measures against.
    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    pub fn state(&self) -> SessionState {
        if self.markers.iter().all(Option::is_some) {
            SessionState::Ready
        } else {
            SessionState::MarkersIncomplete
        }
    }

    /// Place or move one of the two markers.
    pub fn set_marker(
        &mut self,
        slot: MarkerSlot,
        position: MarkerPosition,
    ) -> Result<(), SessionError> {
        if !position.is_finite() {
            return Err(SessionError::NonFiniteMarker);
        }
        let idx = match slot {
            MarkerSlot::First => 0,
            MarkerSlot::Second => 1,
        };
        self.markers[idx] = Some(position);
        Ok(())
    }

    pub fn marker(&self, slot: MarkerSlot) -> Option<MarkerPosition> {
        match slot {
            MarkerSlot::First => self.markers[0],
            MarkerSlot::Second => self.markers[1],
        }
    }

    /// Remove both markers, returning to [`SessionState::MarkersIncomplete`].
    pub fn clear_markers(&mut self) {
        self.markers = [None, None];
    }

    /// Update the distance-to-subject estimate. The slider UI keeps this in
    /// [`MIN_USER_DISTANCE`]..=[`MAX_USER_DISTANCE`]; the session only
    /// insists it is finite and positive.
    pub fn set_user_distance(&mut self, distance: Inches) -> Result<(), SessionError> {
        if !distance.is_positive() {
            return Err(SessionError::InvalidDistance {
                distance: distance.get(),
            });
        }
        self.user_distance = distance;
        Ok(())
    }

    pub fn user_distance(&self) -> Inches {
        self.user_distance
    }

    /// Recompute the measurement from the current inputs.
    ///
    /// Returns `None` while fewer than two markers are placed. Calling this
    /// repeatedly with unchanged inputs always yields the same value.
    pub fn measurement(&self) -> Option<Measurement> {
        let (p1, p2) = match self.markers {
            [Some(p1), Some(p2)] => (p1, p2),
            _ => return None,
        };
        let span = pixel_distance(p1, p2);
        Some(Measurement {
            span,
            length: self.record.span_inches(span, self.user_distance),
            midpoint: segment_midpoint(p1, p2),
            angle_deg: segment_angle_deg(p1, p2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn session() -> MeasurementSession {
        let record = CalibrationRecord::new(100.0 / 3.375, Inches(36.0)).unwrap();
        MeasurementSession::new(record).unwrap()
    }

    #[test]
    fn no_measurement_until_both_markers() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::MarkersIncomplete);
        assert!(s.measurement().is_none());

        s.set_marker(MarkerSlot::First, MarkerPosition::new(0.0, 0.0))
            .unwrap();
        assert_eq!(s.state(), SessionState::MarkersIncomplete);
        assert!(s.measurement().is_none());

        s.set_marker(MarkerSlot::Second, MarkerPosition::new(200.0, 0.0))
            .unwrap();
        assert_eq!(s.state(), SessionState::Ready);
        assert!(s.measurement().is_some());
    }

    #[test]
    fn double_pixel_span_at_reference_distance_doubles_inches() {
        // Calibrated on a 3.375 in card spanning 100 px at 36 in; a 200 px
        // span at the same distance is twice the card width.
        let mut s = session();
        s.set_marker(MarkerSlot::First, MarkerPosition::new(0.0, 0.0))
            .unwrap();
        s.set_marker(MarkerSlot::Second, MarkerPosition::new(200.0, 0.0))
            .unwrap();
        let m = s.measurement().unwrap();
        assert_relative_eq!(m.length.get(), 6.75, epsilon = 1e-9);
        assert_relative_eq!(m.span.get(), 200.0);
        assert_relative_eq!(m.midpoint.x, 100.0);
        assert_relative_eq!(m.angle_deg, 0.0);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let mut s = session();
        s.set_marker(MarkerSlot::First, MarkerPosition::new(10.0, 20.0))
            .unwrap();
        s.set_marker(MarkerSlot::Second, MarkerPosition::new(310.0, 420.0))
            .unwrap();
        s.set_user_distance(Inches(48.0)).unwrap();
        let first = s.measurement().unwrap();
        for _ in 0..10 {
            assert_eq!(s.measurement().unwrap(), first);
        }
    }

    #[test]
    fn length_is_non_negative() {
        let mut s = session();
        s.set_marker(MarkerSlot::First, MarkerPosition::new(-50.0, 80.0))
            .unwrap();
        s.set_marker(MarkerSlot::Second, MarkerPosition::new(30.0, -15.0))
            .unwrap();
        for d in [12.0, 36.0, 96.0] {
            s.set_user_distance(Inches(d)).unwrap();
            assert!(s.measurement().unwrap().length.get() >= 0.0);
        }
    }

    #[test]
    fn clear_markers_resets_state() {
        let mut s = session();
        s.set_marker(MarkerSlot::First, MarkerPosition::new(0.0, 0.0))
            .unwrap();
        s.set_marker(MarkerSlot::Second, MarkerPosition::new(10.0, 0.0))
            .unwrap();
        s.clear_markers();
        assert_eq!(s.state(), SessionState::MarkersIncomplete);
        assert!(s.measurement().is_none());
    }

    #[test]
    fn rejects_bad_inputs_at_the_boundary() {
        let mut s = session();
        assert!(s
            .set_marker(MarkerSlot::First, MarkerPosition::new(f64::NAN, 0.0))
            .is_err());
        assert!(s.set_user_distance(Inches(0.0)).is_err());
        assert!(s.set_user_distance(Inches(-12.0)).is_err());
        assert!(s.set_user_distance(Inches(f64::NAN)).is_err());
        // Distance unchanged after the rejected updates.
        assert_eq!(s.user_distance(), DEFAULT_USER_DISTANCE);
    }

    #[test]
    fn distance_clamp_matches_slider_bounds() {
        assert_eq!(clamp_user_distance(Inches(5.0)), MIN_USER_DISTANCE);
        assert_eq!(clamp_user_distance(Inches(500.0)), MAX_USER_DISTANCE);
        assert_eq!(clamp_user_distance(Inches(42.0)), Inches(42.0));
    }

    #[test]
    fn session_rejects_invalid_record() {
        let bad = CalibrationRecord {
            pixels_per_inch: 0.0,
            reference_distance: Inches(36.0),
        };
        assert!(matches!(
            MeasurementSession::new(bad),
            Err(SessionError::InvalidCalibration(_))
        ));
    }
}
