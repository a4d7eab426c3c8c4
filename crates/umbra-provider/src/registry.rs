//! In-memory provider registry.
//!
//! The registry is constructed once at process start and passed explicitly
//! into the orchestrator. It is mutated only by explicit register/unregister
//! calls - treat registration as configuration-time, not scan-time.

use crate::error::{ProviderError, Result};
use crate::provider::{Provider, Registration};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use umbra_core::ProviderId;

/// Registry mapping provider identifiers to implementations.
///
/// Cloning is cheap; clones share the same underlying table.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    providers: Arc<RwLock<HashMap<ProviderId, Registration>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a provider implementation under `id`.
    ///
    /// Replaces any previous registration for the same id. The metadata key
    /// `disabled: true` excludes the provider from scans without
    /// unregistering it.
    pub fn register(
        &self,
        id: ProviderId,
        provider: Arc<dyn Provider>,
        metadata: HashMap<String, Value>,
    ) {
        let mut table = self
            .providers
            .write()
            .expect("acquire write lock on providers");

        debug!(provider_id = %id, "registered provider");
        table.insert(id, Registration { provider, metadata });
    }

    /// Remove a provider registration.
    ///
    /// Returns `true` if the provider was present, `false` otherwise.
    pub fn unregister(&self, id: &ProviderId) -> bool {
        let mut table = self
            .providers
            .write()
            .expect("acquire write lock on providers");

        let removed = table.remove(id).is_some();

        if removed {
            debug!(provider_id = %id, "unregistered provider");
        }

        removed
    }

    /// Get a provider implementation by id.
    ///
    /// # Errors
    /// Returns [`ProviderError::NotFound`] if the id is not registered.
    pub fn get(&self, id: &ProviderId) -> Result<Arc<dyn Provider>> {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table
            .get(id)
            .map(|r| Arc::clone(&r.provider))
            .ok_or_else(|| ProviderError::NotFound {
                provider_id: id.to_string(),
            })
    }

    /// Metadata attached to a provider at registration time.
    #[must_use]
    pub fn metadata(&self, id: &ProviderId) -> Option<HashMap<String, Value>> {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table.get(id).map(|r| r.metadata.clone())
    }

    /// List all registered provider ids with their metadata.
    #[must_use]
    pub fn list_all(&self) -> Vec<(ProviderId, HashMap<String, Value>)> {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table
            .iter()
            .map(|(id, r)| (id.clone(), r.metadata.clone()))
            .collect()
    }

    /// All registered provider ids.
    #[must_use]
    pub fn ids(&self) -> Vec<ProviderId> {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table.keys().cloned().collect()
    }

    /// Check whether a provider is enabled.
    ///
    /// A provider is enabled unless its metadata carries `disabled: true`.
    /// Unknown ids are reported as enabled; they fail later at lookup.
    #[must_use]
    pub fn is_enabled(&self, id: &ProviderId) -> bool {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table.get(id).map_or(true, |r| !r.is_disabled())
    }

    /// Number of registered providers.
    #[must_use]
    pub fn count(&self) -> usize {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table.len()
    }

    /// Check whether a provider id is registered.
    #[must_use]
    pub fn contains(&self, id: &ProviderId) -> bool {
        let table = self
            .providers
            .read()
            .expect("acquire read lock on providers");

        table.contains_key(id)
    }
}
