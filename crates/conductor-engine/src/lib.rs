//! # Conductor Engine
//!
//! Executes workflows: dependency graphs of tasks, each bound to an agent.
//!
//! The engine validates the graph up front, dispatches ready tasks by
//! priority, suspends a branch while its approval request is pending and
//! aggregates every task's outcome into a [`WorkflowResult`].
//!
//! - [`WorkflowEngine`] - validation, execution, events and live status
//! - [`Agent`] - LLM-backed, tool-backed or composite execution unit
//! - [`WorkflowDefinition`] - YAML/JSON workflow templates
//! - [`AgentMemory`] - key-value and conversation memory for agent runs
//! - [`WorkflowStore`] - named workflow catalog

pub mod agent;
pub mod engine;
pub mod error;
pub mod memory;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{
    Agent, AgentKind, AgentOutcome, AgentRegistry, AgentServices, AgentSummary, LlmBinding,
    Stage, TaskInvocation, ToolBinding,
};
pub use engine::{
    EngineConfig, EngineEvent, RunOptions, TaskReport, WorkflowEngine, WorkflowResult,
    WorkflowSnapshot,
};
pub use error::WorkflowError;
pub use memory::{AgentMemory, ChatMessage, MemoryEntry};
pub use workflow::{
    MemoryWorkflowStore, RetryPolicy, Task, TaskDefinition, TaskPriority, TaskStatus, Workflow,
    WorkflowDefinition, WorkflowStatus, WorkflowStore, load_dir,
};
