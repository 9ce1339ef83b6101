//! # Conductor Built-in Tools
//!
//! Small data tools available to every deployment.
//!
//! ## Tools
//!
//! - `echo`: Return the arguments unchanged
//! - `json_extract`: Pull a dotted path out of a JSON value

use std::sync::Arc;

use conductor_core::ToolRegistry;
use conductor_protocols::error::RegistryError;

pub mod tools;

pub use tools::{EchoTool, JsonExtractTool};

/// Register every built-in tool.
pub fn register_builtin_tools(registry: &ToolRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(EchoTool::new()))?;
    registry.register(Arc::new(JsonExtractTool::new()))?;
    Ok(())
}
