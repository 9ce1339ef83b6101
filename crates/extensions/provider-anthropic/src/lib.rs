//! Anthropic messages API provider for Conductor.

mod api;
mod converter;
mod provider;

pub use provider::AnthropicProvider;
