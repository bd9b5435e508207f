//! Async front for callers on a tokio runtime.
//!
//! Registry work is blocking filesystem I/O plus advisory locks, so each call
//! runs on the blocking pool.

use std::sync::Arc;

use super::error::RegistryError;
use super::record::ModelEntry;
use super::service::{RegistryService, SwitchOutcome};

/// Cheaply cloneable async handle to a [`RegistryService`].
#[derive(Clone)]
pub struct RegistryHandle {
    inner: Arc<RegistryService>,
}

impl RegistryHandle {
    pub fn new(service: RegistryService) -> Self {
        Self { inner: Arc::new(service) }
    }

    /// The wrapped service, for synchronous callers.
    pub fn service(&self) -> &RegistryService {
        &self.inner
    }

    pub async fn list_models(&self) -> Result<Vec<ModelEntry>, RegistryError> {
        self.run(|svc| svc.list()).await
    }

    pub async fn apply_model(&self, name: &str) -> Result<SwitchOutcome, RegistryError> {
        let name = name.to_string();
        self.run(move |svc| svc.switch_active(&name)).await
    }

    pub async fn delete_model(&self, name: &str) -> Result<(), RegistryError> {
        let name = name.to_string();
        self.run(move |svc| svc.delete_model(&name)).await
    }

    pub async fn active_model(&self) -> Result<Option<String>, RegistryError> {
        self.run(|svc| svc.active_model()).await
    }

    async fn run<T, F>(&self, op: F) -> Result<T, RegistryError>
    where
        T: Send + 'static,
        F: FnOnce(&RegistryService) -> Result<T, RegistryError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&inner))
            .await
            .map_err(|e| RegistryError::Internal(format!("registry task failed: {}", e)))?
    }
}
