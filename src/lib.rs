//! Model Registry
//!
//! An on-disk catalog of trained model directories with exactly one
//! designated active model.
//!
//! # Layout
//!
//! - `<root>/<name>/metadata.json`: one model per immediate subdirectory
//! - `<root>/active.json`: the active-model pointer
//! - `<root>/.locks/`: advisory lock files, never deleted
//!
//! # Guarantees
//!
//! - The filesystem is the source of truth; nothing is cached.
//! - Missing identifiers and trained-at timestamps are backfilled once and
//!   persisted, so they stay stable across listings.
//! - All writes are write-to-temp-then-rename.
//! - Pointer and per-model mutations are serialized with OS file locks that
//!   hold across processes.

pub mod cli;
pub mod config;
pub mod models;
pub mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use models::{
    CommandNotifier, LogNotifier, Notifier, RegistryHandle, RegistryService,
    DEFAULT_NOTIFY_TIMEOUT,
};

/// Registry construction parameters.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub root: PathBuf,
    /// Executable run with the model name after each switch.
    pub notify_command: Option<PathBuf>,
    /// Kill the notify command if it runs longer than this.
    pub notify_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(config::DEFAULT_ROOT),
            notify_command: None,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

impl From<&config::EnvConfig> for RegistryConfig {
    fn from(env: &config::EnvConfig) -> Self {
        Self {
            root: env.root.clone(),
            notify_command: env.notify_command.clone(),
            notify_timeout: env.notify_timeout,
        }
    }
}

/// Entry point wiring configuration to a registry.
pub struct Registry;

impl Registry {
    /// Build the synchronous service for `config`.
    pub fn service(config: &RegistryConfig) -> RegistryService {
        let notifier: Arc<dyn Notifier> = match &config.notify_command {
            Some(program) => Arc::new(
                CommandNotifier::new(program.clone()).with_timeout(config.notify_timeout),
            ),
            None => Arc::new(LogNotifier),
        };
        RegistryService::with_notifier(config.root.clone(), notifier)
    }

    /// Build an async handle for `config`.
    pub fn new(config: &RegistryConfig) -> RegistryHandle {
        RegistryHandle::new(Self::service(config))
    }
}
