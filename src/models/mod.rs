//! Filesystem-backed model registry.
//!
//! Each immediate subdirectory of the registry root is a model described by
//! its `metadata.json`. `active.json` at the root names the active model.
//! Advisory locks under `.locks/` serialize writers across threads and
//! processes.

mod active;
mod error;
mod handle;
mod lock;
mod metadata;
mod notifier;
mod persist;
mod record;
mod scanner;
mod service;

pub use active::{ActivePointer, POINTER_FILENAME};
pub use error::RegistryError;
pub use handle::RegistryHandle;
pub use lock::{LockGuard, LockTable, LOCK_DIR};
pub use metadata::{MetadataStore, METADATA_FILENAME};
pub use notifier::{
    CommandNotifier, LogNotifier, NotifyError, Notifier, DEFAULT_NOTIFY_TIMEOUT,
};
pub use persist::{atomic_write, atomic_write_json};
pub use record::{listing_order, BackfillReport, ModelEntry, ModelRecord, TrainDate};
pub use scanner::{DirectoryScanner, ModelDir};
pub use service::{RegistryService, SwitchOutcome};
