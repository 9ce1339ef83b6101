//! Provider registry for managing LLM providers.

use std::sync::Arc;

use conductor_protocols::error::RegistryError;
use conductor_protocols::provider::LLMProvider;

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn LLMProvider {
    fn registry_id(&self) -> &str {
        self.id()
    }
}

/// Registry for managing LLM providers.
///
/// Populated once at startup; model routes refer to providers by id.
pub struct ProviderRegistry {
    inner: BaseRegistry<dyn LLMProvider>,
}

impl ProviderRegistry {
    /// Create a new provider registry.
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Register a provider.
    pub fn register(&self, provider: Arc<dyn LLMProvider>) -> Result<(), RegistryError> {
        self.inner.register(provider)
    }

    /// Unregister a provider.
    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.inner.unregister(id)
    }

    /// Get a provider by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn LLMProvider>> {
        self.inner.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    /// List all provider IDs, sorted.
    pub fn list_ids(&self) -> Vec<String> {
        self.inner.list_ids()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
