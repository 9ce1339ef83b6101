//! Approval gate configuration.

use serde::{Deserialize, Serialize};

/// Storage backend behind the approval gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Approval gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    #[serde(default)]
    pub backend: ApprovalBackend,

    /// SQLite database path (`~` is expanded).
    #[serde(default = "default_approval_path")]
    pub path: String,

    /// How often waiters re-read the store for resolutions made elsewhere.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            backend: ApprovalBackend::default(),
            path: default_approval_path(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_approval_path() -> String {
    "~/.conductor/approvals.db".to_string()
}

fn default_poll_interval() -> u64 {
    500
}
