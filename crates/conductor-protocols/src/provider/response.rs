//! Completion response types.

use serde::{Deserialize, Serialize};

use crate::types::{Message, Metadata, Usage};

/// Response from a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Unique ID for this completion.
    pub id: String,

    /// Model used.
    pub model: String,

    /// The assistant's response message.
    pub message: Message,

    /// Why generation stopped, as reported by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Token usage.
    #[serde(default)]
    pub usage: Usage,

    /// Additional metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl CompletionResponse {
    /// Text of the assistant message.
    pub fn text(&self) -> &str {
        &self.message.content
    }
}
