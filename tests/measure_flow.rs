//! End-to-end workflow: calibrate against a card, persist the record, start
//! a measurement session from storage, and measure at varying distances.

use approx::assert_relative_eq;
use log::LevelFilter;

use span_calib::{
    CalibrationRecord, CalibrationStore, Inches, JsonFileStore, MarkerPosition, MarkerSlot,
    MeasurementSession, ReferenceTarget, SessionError,
};

fn calibrate_card_at_36(span_px: f64) -> CalibrationRecord {
    CalibrationRecord::from_markers(
        MarkerPosition::new(0.0, 0.0),
        MarkerPosition::new(span_px, 0.0),
        &ReferenceTarget::default(),
    )
    .unwrap()
}

#[test]
fn calibrate_persist_measure() {
    let _ = span_calib::init_with_level(LevelFilter::Debug);

    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("calibration.json"));

    // No record yet: a session cannot start.
    assert!(matches!(
        MeasurementSession::from_store(&store),
        Err(SessionError::MissingCalibration)
    ));

    // Calibrate: the card spans 100 px at 36 in.
    let record = calibrate_card_at_36(100.0);
    assert_relative_eq!(record.pixels_per_inch, 100.0 / 3.375);
    store.save(&record).unwrap();

    // Measure a 200 px span at the calibration distance: twice the card.
    let mut session = MeasurementSession::from_store(&store).unwrap();
    session
        .set_marker(MarkerSlot::First, MarkerPosition::new(40.0, 120.0))
        .unwrap();
    session
        .set_marker(MarkerSlot::Second, MarkerPosition::new(240.0, 120.0))
        .unwrap();
    session.set_user_distance(Inches(36.0)).unwrap();
    let m = session.measurement().unwrap();
    assert_relative_eq!(m.length.get(), 6.75, epsilon = 1e-9);

    // Same markers, subject estimated twice as far: twice the inches.
    session.set_user_distance(Inches(72.0)).unwrap();
    assert_relative_eq!(session.measurement().unwrap().length.get(), 13.5, epsilon = 1e-9);
}

#[test]
fn recalibration_replaces_the_record_for_new_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("calibration.json"));
    store.save(&calibrate_card_at_36(100.0)).unwrap();

    let session = MeasurementSession::from_store(&store).unwrap();

    // Recalibrate with a tighter crop: the card now spans 150 px.
    store.save(&calibrate_card_at_36(150.0)).unwrap();

    // The running session keeps the record it was started with.
    assert_relative_eq!(session.record().pixels_per_inch, 100.0 / 3.375);

    // A fresh session sees the replacement.
    let fresh = MeasurementSession::from_store(&store).unwrap();
    assert_relative_eq!(fresh.record().pixels_per_inch, 150.0 / 3.375);
}

#[test]
fn reset_returns_to_the_uncalibrated_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("calibration.json"));
    store.save(&calibrate_card_at_36(100.0)).unwrap();
    assert!(store.load().unwrap().is_some());

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    assert!(matches!(
        MeasurementSession::from_store(&store),
        Err(SessionError::MissingCalibration)
    ));
}

#[test]
fn tampered_record_on_disk_is_rejected_at_session_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibration.json");
    std::fs::write(
        &path,
        r#"{"pixelsPerInch": 0.0, "calibrationDistance": 36.0}"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&path);
    // The file round-trips, but the record fails validation.
    assert!(store.load().unwrap().is_some());
    assert!(matches!(
        MeasurementSession::from_store(&store),
        Err(SessionError::InvalidCalibration(_))
    ));
}
