//! Google Gemini provider for Conductor.

mod provider;
mod types;

pub use provider::GeminiProvider;
