//! Tool trait definitions.

use async_trait::async_trait;

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;
use crate::types::RiskLevel;

/// Core trait for tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError>;

    /// Validate the arguments before execution.
    fn validate(&self, arguments: &serde_json::Value) -> Result<(), ToolError> {
        let definition = self.definition();
        if let Some(schema) = &definition.parameters_schema {
            if schema.get("type") == Some(&serde_json::json!("object")) && !arguments.is_object() {
                return Err(ToolError::InvalidArguments(
                    "arguments must be an object".to_string(),
                ));
            }
            let required = schema
                .get("required")
                .and_then(|r| r.as_array())
                .into_iter()
                .flatten()
                .filter_map(|r| r.as_str());
            for field in required {
                if arguments.get(field).is_none() {
                    return Err(ToolError::InvalidArguments(format!(
                        "missing required argument `{}`",
                        field
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the risk level of this tool.
    fn risk_level(&self) -> RiskLevel {
        self.definition().risk_level
    }
}

/// Name-based tool invocation.
///
/// `invoke(name, arguments) -> result | error` is the whole contract agents
/// rely on.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke a tool by name.
    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError>;

    /// Risk level of a tool, if it is known.
    fn risk_level(&self, name: &str) -> Option<RiskLevel> {
        let _ = name;
        None
    }
}

#[cfg(test)]
#[path = "traits_tests.rs"]
mod tests;
