//! Tool definition types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Metadata, RiskLevel};

/// Definition of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique identifier, used as the invocation name.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Description of what the tool does.
    pub description: String,

    /// JSON Schema for the arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_schema: Option<serde_json::Value>,

    /// Risk level for this tool.
    #[serde(default)]
    pub risk_level: RiskLevel,

    /// Additional metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
            risk_level: RiskLevel::Low,
            metadata: HashMap::new(),
        }
    }

    /// Set the parameters schema.
    pub fn with_parameters_schema(mut self, schema: serde_json::Value) -> Self {
        self.parameters_schema = Some(schema);
        self
    }

    /// Set the risk level.
    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = ToolDefinition::new("echo", "Echo", "Returns its arguments")
            .with_parameters_schema(serde_json::json!({"type": "object"}))
            .with_risk_level(RiskLevel::Medium);
        assert_eq!(def.id, "echo");
        assert_eq!(def.risk_level, RiskLevel::Medium);
        assert!(def.parameters_schema.is_some());
    }

    #[test]
    fn test_definition_deserialize_defaults() {
        let def: ToolDefinition = serde_json::from_value(serde_json::json!({
            "id": "t", "name": "T", "description": "d"
        }))
        .unwrap();
        assert_eq!(def.risk_level, RiskLevel::Low);
        assert!(def.metadata.is_empty());
    }
}
