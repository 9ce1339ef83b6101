//! JSON path extraction tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use conductor_protocols::error::ToolError;
use conductor_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

#[derive(Debug, Deserialize)]
struct JsonExtractParams {
    data: Value,
    path: String,
}

/// Pulls a dotted path (`invoice.lines.0.amount`) out of a JSON value.
pub struct JsonExtractTool {
    definition: ToolDefinition,
}

impl JsonExtractTool {
    pub fn new() -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "data": {
                    "description": "JSON value to read from"
                },
                "path": {
                    "type": "string",
                    "description": "Dotted path; numeric segments index arrays"
                }
            },
            "required": ["data", "path"]
        });

        Self {
            definition: ToolDefinition::new(
                "json_extract",
                "JSON Extract",
                "Extract the value at a dotted path from a JSON document.",
            )
            .with_parameters_schema(schema),
        }
    }
}

impl Default for JsonExtractTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk `path` through `data`. An empty path returns the whole value.
pub(crate) fn extract<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

#[async_trait]
impl Tool for JsonExtractTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        arguments: Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: JsonExtractParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        // Accept documents passed as JSON text as well as structured values.
        let data = match params.data {
            Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            other => other,
        };

        debug!("json_extract: path={}", params.path);
        match extract(&data, &params.path) {
            Some(value) => Ok(ToolResult::success_json(value.to_string(), value.clone())),
            None => Ok(ToolResult::error(format!("path `{}` not found", params.path))),
        }
    }
}
