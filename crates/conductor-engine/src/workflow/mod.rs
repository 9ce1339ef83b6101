//! Workflows, tasks and their definition files.

mod definition;
pub(crate) mod graph;
mod model;
mod store;

pub use definition::{TaskDefinition, WorkflowDefinition};
pub use graph::topological_order;
pub use model::{RetryPolicy, Task, TaskPriority, TaskStatus, Workflow, WorkflowStatus};
pub use store::{MemoryWorkflowStore, WorkflowStore, load_dir};
