//! Explicit scheme to constructor table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::TRACING_TARGET;
use crate::config::BackendConfig;
use crate::error::{StorageError, StorageResult};
use crate::storage::ObjectStorage;

/// Constructor registered for a storage scheme.
pub type BackendFactory = fn(&BackendConfig) -> StorageResult<Arc<dyn ObjectStorage>>;

/// Maps storage schemes (`qiniu`, `s3`, ...) to backend constructors.
///
/// The registry is a plain value: the application fills it during startup
/// and then creates backends from it.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `scheme`, replacing any previous entry.
    pub fn register(&mut self, scheme: impl Into<String>, factory: BackendFactory) -> &mut Self {
        let scheme = scheme.into().to_ascii_lowercase();
        if self.factories.insert(scheme.clone(), factory).is_some() {
            tracing::warn!(
                target: TRACING_TARGET,
                scheme = %scheme,
                "Replacing registered storage backend"
            );
        }
        self
    }

    /// Returns whether a constructor is registered under `scheme`.
    pub fn contains(&self, scheme: &str) -> bool {
        self.factories.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Returns the registered schemes in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Constructs the backend registered under `scheme`.
    pub fn create(
        &self,
        scheme: &str,
        config: &BackendConfig,
    ) -> StorageResult<Arc<dyn ObjectStorage>> {
        let factory = self
            .factories
            .get(&scheme.to_ascii_lowercase())
            .ok_or_else(|| StorageError::UnknownBackend(scheme.to_string()))?;

        let storage = factory(config)?;

        tracing::info!(
            target: TRACING_TARGET,
            scheme = %scheme,
            storage = %storage,
            "Storage backend created"
        );

        Ok(storage)
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("schemes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
