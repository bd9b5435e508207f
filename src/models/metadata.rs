//! Loading, backfilling and persisting per-model metadata.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::error::RegistryError;
use super::lock::LockTable;
use super::persist::atomic_write;
use super::record::{ModelEntry, ModelRecord, TrainDate};
use super::scanner::ModelDir;
use crate::telemetry;

/// Metadata filename inside each model directory.
pub const METADATA_FILENAME: &str = "metadata.json";

/// Reads and writes `<model>/metadata.json`.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    locks: LockTable,
}

impl MetadataStore {
    pub fn new(locks: LockTable) -> Self {
        Self { locks }
    }

    pub fn metadata_path(dir: &Path) -> PathBuf {
        dir.join(METADATA_FILENAME)
    }

    /// Read and parse a model's metadata without modifying it.
    pub fn load(&self, dir: &Path) -> Result<ModelRecord, RegistryError> {
        let path = Self::metadata_path(dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RegistryError::MissingMetadata(path));
            }
            Err(e) => {
                return Err(RegistryError::MalformedMetadata { path, reason: e.to_string() });
            }
        };
        ModelRecord::from_json(&content)
            .map_err(|e| RegistryError::MalformedMetadata { path, reason: e.to_string() })
    }

    /// Atomically overwrite a model's metadata with `record`.
    pub fn persist(&self, dir: &Path, record: &ModelRecord) -> Result<(), RegistryError> {
        let path = Self::metadata_path(dir);
        let json = record.to_json().map_err(|e| RegistryError::Persist {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        atomic_write(&path, &json)
    }

    /// Migrate-on-read: fill a missing identifier or trained-at timestamp and
    /// write the record back.
    ///
    /// Runs under the model lock and re-reads the file once the lock is held,
    /// so a concurrent backfill by another thread or process is observed
    /// rather than overwritten with a second identifier.
    pub fn backfill(&self, dir: &ModelDir) -> Result<ModelRecord, RegistryError> {
        let _guard = self.locks.model(&dir.name)?;

        let mut record = self.load(&dir.path)?;
        let report = record.backfill(TrainDate::now);
        if report.is_empty() {
            return Ok(record);
        }

        self.persist(&dir.path, &record)?;

        if report.id_generated {
            telemetry::record_backfill("id");
        }
        if report.train_date_set {
            telemetry::record_backfill("train_date");
        }
        info!(
            model = %dir.name,
            id_generated = report.id_generated,
            train_date_set = report.train_date_set,
            "Backfilled model metadata"
        );
        Ok(record)
    }

    /// Turn a scanned directory into an entry, backfilling if needed.
    ///
    /// The directory name is authoritative for the entry's name.
    pub fn materialize(&self, dir: &ModelDir) -> Result<ModelEntry, RegistryError> {
        let mut record = self.load(&dir.path)?;
        if record.needs_backfill() {
            record = self.backfill(dir)?;
        }

        match record.name.as_deref() {
            Some(name) if name == dir.name => {}
            Some(name) => warn!(
                model = %dir.name,
                metadata_name = %name,
                "Metadata name differs from directory name; using directory name"
            ),
            None => warn!(model = %dir.name, "Metadata has no name; using directory name"),
        }

        record.to_entry(&dir.name).ok_or_else(|| {
            RegistryError::Internal(format!("record for {} incomplete after backfill", dir.name))
        })
    }
}
