//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod schema_agents;
mod schema_approval;
mod schema_engine;

pub use schema_agents::*;
pub use schema_approval::*;
pub use schema_engine::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub approval: ApprovalConfig,

    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Provider configuration, keyed by provider id in `[providers.<id>]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Wire protocol spoken by the provider.
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            api_key: None,
            base_url: None,
            default_model: None,
            extra: HashMap::new(),
        }
    }
}

fn default_provider_kind() -> String {
    "openai".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
