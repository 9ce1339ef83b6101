//! Engine and gateway configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Workflow engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of tasks dispatched at once per workflow.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Default per-task timeout.
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,

    /// Default whole-workflow timeout. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_timeout_seconds: Option<u64>,

    /// Length of each wait on a pending approval.
    #[serde(default = "default_approval_wait_chunk")]
    pub approval_wait_chunk_seconds: u64,

    /// Directory of YAML/JSON workflow definitions loaded at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows_dir: Option<PathBuf>,

    /// Agent memory entries kept before the oldest is evicted.
    #[serde(default = "default_memory_max_entries")]
    pub memory_max_entries: usize,

    /// Lifetime of agent memory entries. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_ttl_seconds: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            task_timeout_seconds: default_task_timeout(),
            workflow_timeout_seconds: None,
            approval_wait_chunk_seconds: default_approval_wait_chunk(),
            workflows_dir: None,
            memory_max_entries: default_memory_max_entries(),
            memory_ttl_seconds: None,
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_task_timeout() -> u64 {
    60
}

fn default_approval_wait_chunk() -> u64 {
    5
}

fn default_memory_max_entries() -> usize {
    1000
}

/// Process-wide model route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provider tried first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,

    /// Providers tried in order after the preferred one.
    #[serde(default)]
    pub fallbacks: Vec<String>,

    /// Bound on a single provider call.
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,

    /// Register providers for the API keys found in the environment.
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            preferred: None,
            fallbacks: Vec::new(),
            timeout_seconds: default_gateway_timeout(),
            auto_detect: default_auto_detect(),
        }
    }
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_auto_detect() -> bool {
    true
}
