//! Agent registry.

use std::sync::Arc;

use conductor_core::{BaseRegistry, Registerable};
use conductor_protocols::error::RegistryError;

use super::model::{Agent, AgentSummary};

impl Registerable for Agent {
    fn registry_id(&self) -> &str {
        &self.id
    }
}

/// Agents known to the engine. Populated at startup, before any workflow runs.
#[derive(Default)]
pub struct AgentRegistry {
    inner: BaseRegistry<Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, agent: Agent) -> Result<(), RegistryError> {
        self.inner.register(Arc::new(agent))
    }

    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.inner.unregister(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Agent>> {
        self.inner.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Summaries of all agents, sorted by id.
    pub fn list(&self) -> Vec<AgentSummary> {
        let mut agents: Vec<AgentSummary> = self.inner.iter().map(|a| a.summary()).collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::LlmBinding;

    #[test]
    fn test_register_and_list() {
        let registry = AgentRegistry::new();
        registry.register(Agent::tool("fetcher", "http_get")).unwrap();
        registry
            .register(Agent::llm("analyst", LlmBinding::new()).with_name("Analyst"))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("fetcher"));
        let listed = registry.list();
        assert_eq!(listed[0].id, "analyst");
        assert_eq!(listed[0].name, "Analyst");
        assert_eq!(listed[0].kind, "llm");
        assert_eq!(listed[1].kind, "tool");
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let registry = AgentRegistry::new();
        registry.register(Agent::tool("fetcher", "a")).unwrap();
        let err = registry.register(Agent::tool("fetcher", "b")).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(id) if id == "fetcher"));
    }
}
