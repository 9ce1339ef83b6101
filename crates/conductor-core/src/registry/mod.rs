//! Registries for tools and providers.

mod base;
mod provider;
mod tool;

pub use base::{BaseRegistry, Registerable};
pub use provider::ProviderRegistry;
pub use tool::ToolRegistry;
