//! Workflow execution.

mod board;
mod config;
mod events;
mod executor;
mod result;
mod run;

pub use config::EngineConfig;
pub use events::{EngineEvent, WorkflowSnapshot};
pub use executor::{RunOptions, WorkflowEngine};
pub use result::{TaskReport, WorkflowResult};
