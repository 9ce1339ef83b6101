//! OpenAI-compatible chat completions provider for Conductor.
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol
//! (OpenAI, Azure-style proxies, Ollama, vLLM).

mod api;
mod provider;

pub use provider::OpenAICompatibleProvider;
