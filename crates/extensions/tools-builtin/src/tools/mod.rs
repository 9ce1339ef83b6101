//! Built-in tool implementations.

mod echo;
mod json_extract;

pub use echo::EchoTool;
pub use json_extract::JsonExtractTool;
