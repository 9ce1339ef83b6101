//! Engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow {0} has no tasks")]
    EmptyWorkflow(String),

    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),

    #[error("Task {task} depends on unknown task {dependency}")]
    UnknownDependency { task: String, dependency: String },

    #[error("Task {task} references unregistered agent {agent}")]
    UnregisteredAgent { task: String, agent: String },

    #[error("Dependency cycle among tasks: {}", .0.join(", "))]
    GraphCycle(Vec<String>),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Workflow {0} is already running")]
    AlreadyRunning(String),

    #[error("No suspended run for workflow {0}")]
    NotSuspended(String),

    #[error("Invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error("Workflow store error: {0}")]
    Store(String),
}

impl WorkflowError {
    /// Whether the error was caused by the caller's input rather than the runtime.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Store(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WorkflowNotFound(_) | Self::AgentNotFound(_) | Self::NotSuspended(_)
        )
    }
}
