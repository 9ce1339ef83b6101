//! # Conductor Core
//!
//! Process-wide registries, built once at startup and handed to the
//! gateway, agents and engine by constructor injection.
//!
//! - [`BaseRegistry`] - Generic id-keyed registry
//! - [`ToolRegistry`] - Tools, invocable by name through [`ToolInvoker`](conductor_protocols::ToolInvoker)
//! - [`ProviderRegistry`] - LLM providers addressed by model routes

pub mod registry;

pub use registry::{BaseRegistry, ProviderRegistry, Registerable, ToolRegistry};
