//! Agent declarations (`[[agents]]`).

use serde::{Deserialize, Serialize};

/// Agent variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKindConfig {
    #[default]
    Llm,
    Tool,
    Composite,
}

/// Stage variant inside a composite agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKindConfig {
    Llm,
    Tool,
}

/// A declared agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,

    /// Display name, defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub kind: AgentKindConfig,

    /// Route override for LLM agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,

    #[serde(default)]
    pub fallbacks: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Default tool for tool agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default)]
    pub requires_approval: bool,

    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

impl AgentConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One stage of a composite agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub kind: StageKindConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,

    #[serde(default)]
    pub fallbacks: Vec<String>,
}
