//! Registry orchestration: list, switch and delete.
//!
//! The filesystem is the only state. Every call re-derives entries from disk;
//! nothing is cached between calls.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::active::ActivePointer;
use super::error::RegistryError;
use super::lock::LockTable;
use super::metadata::MetadataStore;
use super::notifier::{LogNotifier, Notifier};
use super::record::{listing_order, ModelEntry};
use super::scanner::{DirectoryScanner, ModelDir};
use crate::telemetry::{self, RegistrySpan, SpanExt};

/// Result of a successful switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchOutcome {
    pub model: String,
    /// Set when the pointer was written but the serving runtime was not told.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_warning: Option<String>,
}

/// A name is addressable only if it is exactly one plain path component.
fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Orchestrates scanner, metadata store, pointer and notifier.
pub struct RegistryService {
    root: PathBuf,
    scanner: DirectoryScanner,
    store: MetadataStore,
    pointer: ActivePointer,
    locks: LockTable,
    notifier: Arc<dyn Notifier>,
}

impl RegistryService {
    /// Registry at `root` that only logs switches.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_notifier(root, Arc::new(LogNotifier))
    }

    pub fn with_notifier(root: impl Into<PathBuf>, notifier: Arc<dyn Notifier>) -> Self {
        let root = root.into();
        let locks = LockTable::new(&root);
        Self {
            scanner: DirectoryScanner::new(root.clone()),
            store: MetadataStore::new(locks.clone()),
            pointer: ActivePointer::new(&root),
            locks,
            notifier,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All models, newest first, each flagged with whether it is active.
    pub fn list(&self) -> Result<Vec<ModelEntry>, RegistryError> {
        let span = RegistrySpan::new("list", "*");
        let _enter = span.enter();

        let result = self.collect_entries();
        span.record_result(&result);
        if let Ok(entries) = &result {
            span.record("entries", entries.len());
            telemetry::record_entry_count(entries.len());
        }
        telemetry::record_operation("list", &result);
        result
    }

    /// Make `name` the active model and notify the serving runtime.
    pub fn switch_active(&self, name: &str) -> Result<SwitchOutcome, RegistryError> {
        let span = RegistrySpan::new("switch", name);
        let _enter = span.enter();

        let result = self.switch_locked(name);
        span.record_result(&result);
        telemetry::record_operation("switch", &result);
        result
    }

    /// Remove an inactive model's directory tree.
    pub fn delete_model(&self, name: &str) -> Result<(), RegistryError> {
        let span = RegistrySpan::new("delete", name);
        let _enter = span.enter();

        let result = self.delete_locked(name);
        span.record_result(&result);
        telemetry::record_operation("delete", &result);
        result
    }

    /// Name the pointer currently references, dangling or not.
    pub fn active_model(&self) -> Result<Option<String>, RegistryError> {
        self.pointer.read()
    }

    fn collect_entries(&self) -> Result<Vec<ModelEntry>, RegistryError> {
        let dirs = self.scanner.scan()?;
        let active = self.pointer.read()?;

        let mut entries = Vec::with_capacity(dirs.len());
        for dir in &dirs {
            match self.store.materialize(dir) {
                Ok(mut entry) => {
                    entry.active = active.as_deref() == Some(entry.name.as_str());
                    entries.push(entry);
                }
                Err(e) if e.is_skippable() => {
                    warn!(model = %dir.name, error = %e, "Skipping model directory");
                    telemetry::record_skipped_entry(e.kind());
                }
                Err(e) => {
                    // Backfill could not be made durable; never expose it.
                    error!(model = %dir.name, error = %e, "Failed to backfill model metadata");
                    telemetry::record_skipped_entry(e.kind());
                }
            }
        }

        entries.sort_by(listing_order);
        Ok(entries)
    }

    fn switch_locked(&self, name: &str) -> Result<SwitchOutcome, RegistryError> {
        if !is_valid_name(name) {
            warn!(model = %name, "Rejected switch to invalid model name");
            return Err(RegistryError::NotFound(name.to_string()));
        }

        {
            let _pointer_guard = self.locks.pointer()?;
            self.require_listed(name)?;
            self.pointer.write(name)?;
            info!(model = %name, "Active model switched");
        }

        // Outside the pointer lock: the write is durable and a slow runtime
        // must not stall other writers.
        let notify_warning = match self.notifier.notify_switch(name) {
            Ok(()) => None,
            Err(e) => {
                warn!(model = %name, error = %e, "Serving runtime notification failed");
                telemetry::record_notify_failure();
                Some(e.to_string())
            }
        };

        Ok(SwitchOutcome { model: name.to_string(), notify_warning })
    }

    /// Fail with `NotFound` unless `name` would appear in a listing.
    fn require_listed(&self, name: &str) -> Result<(), RegistryError> {
        let dir = ModelDir { name: name.to_string(), path: self.root.join(name) };
        if !dir.path.is_dir() {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        match self.store.materialize(&dir) {
            Ok(_) => Ok(()),
            Err(e) if e.is_skippable() => {
                warn!(model = %name, error = %e, "Switch target has no usable metadata");
                Err(RegistryError::NotFound(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn delete_locked(&self, name: &str) -> Result<(), RegistryError> {
        if !is_valid_name(name) {
            warn!(model = %name, "Rejected delete of invalid model name");
            return Err(RegistryError::NotFound(name.to_string()));
        }

        let _pointer_guard = self.locks.pointer()?;
        if self.pointer.read()?.as_deref() == Some(name) {
            return Err(RegistryError::Conflict(name.to_string()));
        }

        let _model_guard = self.locks.model(name)?;
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(RegistryError::NotFound(name.to_string()));
        }

        // Not transactional: a failure part-way leaves a partial tree.
        remove_model_dir(&dir)?;
        info!(model = %name, path = %dir.display(), "Deleted model directory");
        Ok(())
    }
}

/// Remove a model directory. A symlinked model only loses its link.
fn remove_model_dir(dir: &Path) -> Result<(), RegistryError> {
    let delete_err = |source| RegistryError::Delete { path: dir.to_path_buf(), source };
    let is_link = fs::symlink_metadata(dir).map_err(delete_err)?.file_type().is_symlink();
    if is_link {
        remove_symlink(dir).map_err(delete_err)
    } else {
        fs::remove_dir_all(dir).map_err(delete_err)
    }
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    fs::remove_dir(path)
}
