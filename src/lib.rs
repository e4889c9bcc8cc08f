//! Estimate the real-world size of a distant object from two on-screen
//! markers, a one-time calibration against a known-size reference, and a
//! user-supplied distance estimate.
//!
//! The model is the pinhole/similar-triangles approximation: apparent pixel
//! size is inversely proportional to distance from the camera. Calibration
//! measures pixels-per-inch against a reference object (by default a standard
//! card, 3.375 in wide) photographed at a known distance; measurement rescales
//! that density to the user's current distance estimate and converts a pixel
//! span to inches. The formula is deliberately simple and is kept exactly as
//! stated — no tilt, lens-distortion, or off-axis correction — because saved
//! calibration records depend on it.
//!
//! The crate is intentionally small and purely computational. Camera preview,
//! marker dragging, and the distance slider belong to the host UI; it feeds a
//! [`MeasurementSession`] and redraws from the returned [`Measurement`] on
//! every input change. The only persisted entity is the
//! [`CalibrationRecord`], behind the [`CalibrationStore`] seam.
//!
//! ```
//! use span_calib::{
//!     CalibrationRecord, Inches, MarkerPosition, MarkerSlot, MeasurementSession,
//!     ReferenceTarget,
//! };
//!
//! // Calibrate: markers on both ends of a card 100 px apart, shot at 36 in.
//! let record = CalibrationRecord::from_markers(
//!     MarkerPosition::new(260.0, 400.0),
//!     MarkerPosition::new(360.0, 400.0),
//!     &ReferenceTarget::default(),
//! )?;
//!
//! // Measure a subject at the same distance spanning 200 px.
//! let mut session = MeasurementSession::new(record)?;
//! session.set_marker(MarkerSlot::First, MarkerPosition::new(100.0, 300.0))?;
//! session.set_marker(MarkerSlot::Second, MarkerPosition::new(300.0, 300.0))?;
//! session.set_user_distance(Inches(36.0))?;
//!
//! let m = session.measurement().unwrap();
//! assert!((m.length.get() - 6.75).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod calibration;
mod geom;
mod logger;
mod session;
mod store;
mod units;

pub use calibration::{
    CalibrationError, CalibrationRecord, ReferenceTarget, CARD_WIDTH, DEFAULT_REFERENCE_DISTANCE,
};
pub use geom::{pixel_distance, segment_angle_deg, segment_midpoint, MarkerPosition};
pub use logger::init_with_level;
pub use session::{
    clamp_user_distance, MarkerSlot, Measurement, MeasurementSession, SessionError, SessionState,
    DEFAULT_USER_DISTANCE, MAX_USER_DISTANCE, MIN_USER_DISTANCE,
};
pub use store::{CalibrationStore, JsonFileStore, MemoryStore, StoreError};
pub use units::{Inches, Pixels};
