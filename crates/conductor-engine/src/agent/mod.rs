//! Agents: the execution units bound to tasks.
//!
//! An [`Agent`] is a tagged variant over LLM-backed, tool-backed and
//! composite execution. Each variant answers a [`TaskInvocation`] with an
//! [`AgentOutcome`].

mod model;
mod registry;
mod run;

pub use model::{
    Agent, AgentKind, AgentOutcome, AgentServices, AgentSummary, LlmBinding, Stage,
    TaskInvocation, ToolBinding,
};
pub use registry::AgentRegistry;
pub use run::DEFAULT_SYSTEM_PROMPT;
