//! Error types for the Conductor protocol layer.

mod approval;
mod provider;
mod registry;
mod tool;

pub use approval::*;
pub use provider::*;
pub use registry::*;
pub use tool::*;
