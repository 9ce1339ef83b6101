//! Tool registry for managing available tools.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use conductor_protocols::error::{RegistryError, ToolError};
use conductor_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolInvoker};
use conductor_protocols::types::RiskLevel;

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Tool {
    fn registry_id(&self) -> &str {
        &self.definition().id
    }
}

/// Registry for managing tools.
pub struct ToolRegistry {
    inner: BaseRegistry<dyn Tool>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Register a tool.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        self.inner.register(tool)
    }

    /// Unregister a tool.
    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.inner.unregister(id)
    }

    /// Get a tool by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.inner.get(id)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// List all tool definitions, sorted by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.inner.iter().map(|t| t.definition().clone()).collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    /// Invoke a tool with an explicit execution context.
    pub async fn invoke_with(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.validate(&arguments)?;

        debug!("Invoking tool {} for {}", name, ctx.requester);
        let result = tool.execute(arguments, ctx).await?;
        if !result.success {
            return Err(ToolError::ExecutionFailed(
                result
                    .error
                    .unwrap_or_else(|| format!("tool {} reported failure", name)),
            ));
        }
        Ok(result.into_value())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        self.invoke_with(name, arguments, ToolContext::new("conductor"))
            .await
    }

    fn risk_level(&self, name: &str) -> Option<RiskLevel> {
        self.get(name).map(|tool| tool.risk_level())
    }
}
