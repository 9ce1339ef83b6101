//! Tool execution result types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Metadata;

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the execution was successful.
    pub success: bool,

    /// Output content.
    pub content: String,

    /// Structured output (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,

    /// Error message if execution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Additional metadata about the execution.
    #[serde(default)]
    pub metadata: Metadata,
}

impl ToolResult {
    /// Create a successful result with text content.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: None,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a successful result with structured output.
    pub fn success_json(content: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: Some(output),
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Create an error result.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            structured_output: None,
            error: Some(error.into()),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Collapse into the value handed back to agents.
    ///
    /// Structured output wins over text content.
    pub fn into_value(self) -> serde_json::Value {
        match self.structured_output {
            Some(output) => output,
            None => serde_json::Value::String(self.content),
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
