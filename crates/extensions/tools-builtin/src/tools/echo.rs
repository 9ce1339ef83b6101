//! Echo tool.

use async_trait::async_trait;

use conductor_protocols::error::ToolError;
use conductor_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

/// Returns its arguments unchanged.
pub struct EchoTool {
    definition: ToolDefinition,
}

impl EchoTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new("echo", "Echo", "Return the arguments unchanged."),
        }
    }
}

impl Default for EchoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success_json(arguments.to_string(), arguments))
    }
}
