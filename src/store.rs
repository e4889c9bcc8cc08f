//! Calibration record persistence.
//!
//! The crate does not care where the record lives, only that it round-trips
//! `{pixelsPerInch, calibrationDistance}` as numbers. [`CalibrationStore`] is
//! the seam: hosts with their own key-value storage implement it (or use
//! [`MemoryStore`] and persist however they like); [`JsonFileStore`] covers
//! the plain-file case.
//!
//! Saving is a wholesale replace with no partial-update path, and a record
//! that fails validation is refused rather than written.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::calibration::{CalibrationError, CalibrationRecord};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("refusing to persist an invalid calibration record: {0}")]
    InvalidRecord(#[from] CalibrationError),
}

/// Load/save/clear contract for the single calibration record.
pub trait CalibrationStore {
    /// The stored record, or `None` when no calibration exists yet.
    fn load(&self) -> Result<Option<CalibrationRecord>, StoreError>;

    /// Replace the stored record. Implementations must validate first so an
    /// invalid record can never be persisted.
    fn save(&mut self, record: &CalibrationRecord) -> Result<(), StoreError>;

    /// Discard the stored record. Clearing an empty store is not an error.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Calibration record stored as a small JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalibrationStore for JsonFileStore {
    fn load(&self) -> Result<Option<CalibrationRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let record: CalibrationRecord = serde_json::from_str(&raw)?;
        debug!("loaded calibration from {}", self.path.display());
        Ok(Some(record))
    }

    fn save(&mut self, record: &CalibrationRecord) -> Result<(), StoreError> {
        record.validate()?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json)?;
        info!("saved calibration to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("cleared calibration at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and hosts that bring their own persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    record: Option<CalibrationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: CalibrationRecord) -> Self {
        Self {
            record: Some(record),
        }
    }
}

impl CalibrationStore for MemoryStore {
    fn load(&self) -> Result<Option<CalibrationRecord>, StoreError> {
        Ok(self.record)
    }

    fn save(&mut self, record: &CalibrationRecord) -> Result<(), StoreError> {
        record.validate()?;
        self.record = Some(*record);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.record = None;
        Ok(())
    }
}
