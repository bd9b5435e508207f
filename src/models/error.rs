//! Registry error types.
//!
//! Per-directory problems (missing or malformed metadata) are skippable and
//! never abort a listing. Everything else is surfaced to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Model {0} is active; switch to another model before deleting it")]
    Conflict(String),

    #[error("Failed to scan registry root {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata missing: {0}")]
    MissingMetadata(PathBuf),

    #[error("Malformed metadata in {path}: {reason}")]
    MalformedMetadata { path: PathBuf, reason: String },

    #[error("Failed to acquire lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path} (tree may be partially removed): {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Returns true if the error only disqualifies a single model directory.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MissingMetadata(_) | Self::MalformedMetadata { .. })
    }

    /// Stable label used for metrics and span fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Scan { .. } => "scan",
            Self::Persist { .. } => "persist",
            Self::MissingMetadata(_) => "missing_metadata",
            Self::MalformedMetadata { .. } => "malformed_metadata",
            Self::Lock { .. } => "lock",
            Self::Delete { .. } => "delete",
            Self::Io { .. } => "io",
            Self::Internal(_) => "internal",
        }
    }
}
