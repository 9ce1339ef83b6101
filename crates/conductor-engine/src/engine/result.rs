//! Aggregate workflow results.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::board::TaskBoard;
use crate::workflow::{Task, TaskStatus, WorkflowStatus};

/// Final state of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub task_id: String,
    pub name: String,
    pub agent_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Attempts after the first one.
    pub retries: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&Task> for TaskReport {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            name: task.name.clone(),
            agent_id: task.agent_id.clone(),
            status: task.status,
            result: task.result.clone(),
            error: task.error.clone(),
            provider: task.provider.clone(),
            approval_id: task.approval_id.clone(),
            notes: task.notes.clone(),
            retries: task.retry_count,
            started_at: task.started_at,
            finished_at: task.finished_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub workflow_id: String,
    pub name: String,
    pub status: WorkflowStatus,
    /// Keyed by task name. Names shared by several tasks get the id appended.
    pub tasks: BTreeMap<String, TaskReport>,
    /// Approval ids still awaiting a decision when the run ended.
    pub pending_approvals: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl WorkflowResult {
    pub(crate) fn from_board(board: &TaskBoard, started_at: DateTime<Utc>) -> Self {
        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for task in &board.tasks {
            *name_counts.entry(task.name.as_str()).or_default() += 1;
        }

        let tasks = board
            .tasks
            .iter()
            .map(|task| {
                let key = if name_counts[task.name.as_str()] > 1 {
                    format!("{} [{}]", task.name, task.id)
                } else {
                    task.name.clone()
                };
                (key, TaskReport::from(task))
            })
            .collect();

        let pending_approvals = board
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::WaitingApproval)
            .filter_map(|t| t.approval_id.clone())
            .collect();

        let finished_at = Utc::now();
        Self {
            workflow_id: board.workflow_id.clone(),
            name: board.name.clone(),
            status: board.status,
            tasks,
            pending_approvals,
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
        }
    }

    /// Report for the task with the given id.
    pub fn task(&self, task_id: &str) -> Option<&TaskReport> {
        self.tasks.values().find(|t| t.task_id == task_id)
    }

    pub fn is_success(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Workflow;
    use tokio::sync::broadcast;

    #[test]
    fn test_duplicate_names_get_id_suffix() {
        let (tx, _rx) = broadcast::channel(4);
        let workflow = Workflow::new("wf")
            .with_task(Task::new("a1", "fetch", "agent"))
            .with_task(Task::new("a2", "fetch", "agent"))
            .with_task(Task::new("b", "merge", "agent"));
        let board = TaskBoard::new(workflow, tx);

        let result = WorkflowResult::from_board(&board, Utc::now());
        let keys: Vec<&str> = result.tasks.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["fetch [a1]", "fetch [a2]", "merge"]);
        assert_eq!(result.task("a2").unwrap().name, "fetch");
        assert!(result.pending_approvals.is_empty());
    }
}
