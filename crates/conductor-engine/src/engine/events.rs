//! Engine events and live status views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflow::{TaskStatus, WorkflowStatus};

/// Published on the engine's broadcast channel as execution progresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    WorkflowStarted {
        workflow_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TaskTransition {
        workflow_id: String,
        task_id: String,
        task_name: String,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    },
    WorkflowFinished {
        workflow_id: String,
        status: WorkflowStatus,
        at: DateTime<Utc>,
    },
}

impl EngineEvent {
    pub fn workflow_id(&self) -> &str {
        match self {
            Self::WorkflowStarted { workflow_id, .. }
            | Self::TaskTransition { workflow_id, .. }
            | Self::WorkflowFinished { workflow_id, .. } => workflow_id,
        }
    }
}

/// Status map of a running workflow, keyed by task id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSnapshot {
    pub workflow_id: String,
    pub name: String,
    pub status: WorkflowStatus,
    pub tasks: BTreeMap<String, TaskStatus>,
}
