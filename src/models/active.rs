//! The active-model pointer, `<root>/active.json`.
//!
//! An absent file means no model is active. A pointer naming a model with no
//! directory is dangling and tolerated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::RegistryError;
use super::persist::atomic_write_json;

/// Pointer filename at the registry root.
pub const POINTER_FILENAME: &str = "active.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointerRecord {
    #[serde(default)]
    active_model: Option<String>,
}

/// Reads and writes the single active-model marker.
#[derive(Debug, Clone)]
pub struct ActivePointer {
    path: PathBuf,
}

impl ActivePointer {
    pub fn new(root: &Path) -> Self {
        Self { path: root.join(POINTER_FILENAME) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse pointer JSON. Blank names mean no active model.
    pub fn parse(json: &str) -> Result<Option<String>, serde_json::Error> {
        let record: PointerRecord = serde_json::from_str(json)?;
        Ok(record.active_model.filter(|name| !name.trim().is_empty()))
    }

    /// Current active model name, if any.
    ///
    /// A missing file is `None`. Unparseable content is logged and read as
    /// `None`; any other read failure is an error.
    pub fn read(&self) -> Result<Option<String>, RegistryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RegistryError::Io { path: self.path.clone(), source });
            }
        };

        match Self::parse(&content) {
            Ok(name) => Ok(name),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable active pointer; treating as none");
                Ok(None)
            }
        }
    }

    /// Point at `name`. Callers hold the pointer lock.
    pub fn write(&self, name: &str) -> Result<(), RegistryError> {
        let record = PointerRecord { active_model: Some(name.to_string()) };
        atomic_write_json(&self.path, &record)
    }
}
