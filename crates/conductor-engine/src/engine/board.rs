//! Shared task status map of one workflow run.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::events::{EngineEvent, WorkflowSnapshot};
use crate::workflow::{Task, TaskStatus, Workflow, WorkflowStatus};

/// Every status change goes through [`transition`](Self::transition), which
/// checks the edge and publishes it.
pub(crate) struct TaskBoard {
    pub(crate) workflow_id: String,
    pub(crate) name: String,
    pub(crate) status: WorkflowStatus,
    pub(crate) inputs: serde_json::Value,
    pub(crate) tasks: Vec<Task>,
    description: String,
    timeout_secs: Option<u64>,
    created_at: DateTime<Utc>,
    events: broadcast::Sender<EngineEvent>,
}

impl TaskBoard {
    pub(crate) fn new(workflow: Workflow, events: broadcast::Sender<EngineEvent>) -> Self {
        Self {
            workflow_id: workflow.id,
            name: workflow.name,
            status: WorkflowStatus::Running,
            inputs: workflow.inputs,
            tasks: workflow.tasks,
            description: workflow.description,
            timeout_secs: workflow.timeout_secs,
            created_at: workflow.created_at,
            events,
        }
    }

    /// The run as a workflow again, task statuses and results included.
    pub(crate) fn to_workflow(&self) -> Workflow {
        Workflow {
            id: self.workflow_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            tasks: self.tasks.clone(),
            status: self.status,
            timeout_secs: self.timeout_secs,
            inputs: self.inputs.clone(),
            created_at: self.created_at,
        }
    }

    /// Move a task to `to`. Returns false, leaving the task untouched, when
    /// the task is already terminal or the edge is not allowed.
    pub(crate) fn transition(&mut self, idx: usize, to: TaskStatus) -> bool {
        let task = &mut self.tasks[idx];
        let from = task.status;
        if from.is_terminal() {
            warn!(
                "Ignoring transition of task {} from terminal status {} to {}",
                task.id, from, to
            );
            return false;
        }
        if !from.can_transition_to(to) {
            warn!("Ignoring invalid transition of task {} from {} to {}", task.id, from, to);
            return false;
        }

        let now = Utc::now();
        task.status = to;
        if to == TaskStatus::Running && task.started_at.is_none() {
            task.started_at = Some(now);
        }
        if to.is_terminal() {
            task.finished_at = Some(now);
        }
        debug!("Task {} {} -> {}", task.id, from, to);

        // No subscribers is fine.
        let _ = self.events.send(EngineEvent::TaskTransition {
            workflow_id: self.workflow_id.clone(),
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            from,
            to,
            at: now,
        });
        true
    }

    pub(crate) fn status_of(&self, idx: usize) -> TaskStatus {
        self.tasks[idx].status
    }

    pub(crate) fn indices_with(&self, status: TaskStatus) -> Vec<usize> {
        (0..self.tasks.len())
            .filter(|&i| self.tasks[i].status == status)
            .collect()
    }

    pub(crate) fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            workflow_id: self.workflow_id.clone(),
            name: self.name.clone(),
            status: self.status,
            tasks: self
                .tasks
                .iter()
                .map(|t| (t.id.clone(), t.status))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> (TaskBoard, broadcast::Receiver<EngineEvent>) {
        let (tx, rx) = broadcast::channel(16);
        let workflow = Workflow::new("wf")
            .with_task(Task::new("a", "A", "agent"))
            .with_task(Task::new("b", "B", "agent"));
        (TaskBoard::new(workflow, tx), rx)
    }

    #[test]
    fn test_transition_publishes_event() {
        let (mut board, mut rx) = board();
        assert!(board.transition(0, TaskStatus::Ready));
        assert!(board.transition(0, TaskStatus::Running));
        assert!(board.tasks[0].started_at.is_some());

        match rx.try_recv().unwrap() {
            EngineEvent::TaskTransition { task_id, from, to, .. } => {
                assert_eq!(task_id, "a");
                assert_eq!(from, TaskStatus::Pending);
                assert_eq!(to, TaskStatus::Ready);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_terminal_transition_is_noop() {
        let (mut board, mut rx) = board();
        assert!(board.transition(0, TaskStatus::Skipped));
        assert!(board.tasks[0].finished_at.is_some());
        assert!(!board.transition(0, TaskStatus::Ready));
        assert_eq!(board.status_of(0), TaskStatus::Skipped);

        rx.try_recv().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalid_edge_is_rejected() {
        let (mut board, _rx) = board();
        assert!(!board.transition(1, TaskStatus::Running));
        assert_eq!(board.status_of(1), TaskStatus::Pending);
    }

    #[test]
    fn test_snapshot() {
        let (mut board, _rx) = board();
        board.transition(1, TaskStatus::Ready);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.status, WorkflowStatus::Running);
        assert_eq!(snapshot.tasks["a"], TaskStatus::Pending);
        assert_eq!(snapshot.tasks["b"], TaskStatus::Ready);
        assert_eq!(board.indices_with(TaskStatus::Ready), vec![1]);
    }

    #[test]
    fn test_to_workflow_keeps_progress() {
        let (mut board, _rx) = board();
        board.transition(0, TaskStatus::Ready);
        board.transition(0, TaskStatus::Running);
        board.transition(0, TaskStatus::WaitingApproval);
        board.tasks[0].approval_id = Some("req-1".to_string());
        board.status = WorkflowStatus::Partial;

        let workflow = board.to_workflow();
        assert_eq!(workflow.id, board.workflow_id);
        assert_eq!(workflow.status, WorkflowStatus::Partial);
        assert_eq!(workflow.tasks[0].status, TaskStatus::WaitingApproval);
        assert_eq!(workflow.tasks[0].approval_id.as_deref(), Some("req-1"));
        assert_eq!(workflow.tasks[1].status, TaskStatus::Pending);
    }
}
