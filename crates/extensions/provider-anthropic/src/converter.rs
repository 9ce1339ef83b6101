//! Message conversion.

use conductor_protocols::types::{Message, MessageRole};

use crate::api::ApiMessage;

/// Split system messages out into the top-level `system` field.
pub fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<ApiMessage>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect();

    let converted = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| ApiMessage {
            role: match m.role {
                MessageRole::Assistant => "assistant",
                _ => "user",
            },
            content: m.content.clone(),
        })
        .collect();

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, converted)
}
