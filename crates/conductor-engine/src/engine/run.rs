//! Control loop of one workflow run.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use conductor_approval::ApprovalGate;
use conductor_protocols::approval::{ApprovalDecision, Resolution};
use conductor_protocols::error::ApprovalError;

use super::board::TaskBoard;
use crate::agent::{Agent, AgentOutcome, AgentServices, TaskInvocation};
use crate::workflow::{TaskStatus, WorkflowStatus};

type Dispatched = (usize, AgentOutcome);
type Watched = (usize, String, Result<Resolution, ApprovalError>);

enum Exit {
    Drained,
    Cancelled,
    TimedOut,
}

/// How a pending task stands with respect to its dependencies.
enum Readiness {
    Waiting,
    /// Carries the names of failed optional dependencies.
    Satisfied(Vec<String>),
    Blocked(String),
}

/// Drives one workflow from its first dispatch to a terminal status.
///
/// Only this loop writes to the board. Agents run on spawned tasks and hand
/// their outcome back through a `JoinSet`; approvals are awaited by watcher
/// tasks that wake the loop when a decision lands.
pub(crate) struct WorkflowRun {
    pub(crate) board: Arc<RwLock<TaskBoard>>,
    pub(crate) deps: Vec<Vec<usize>>,
    pub(crate) agents: Vec<Arc<Agent>>,
    pub(crate) services: AgentServices,
    pub(crate) approvals: Arc<ApprovalGate>,
    pub(crate) max_concurrency: usize,
    pub(crate) task_timeout: Duration,
    pub(crate) approval_wait_chunk: Duration,
    pub(crate) granted: HashSet<usize>,
}

impl WorkflowRun {
    pub(crate) async fn drive(
        mut self,
        deadline: Option<Instant>,
        cancel: CancellationToken,
    ) -> WorkflowStatus {
        let mut running: JoinSet<Dispatched> = JoinSet::new();
        let mut watchers: JoinSet<Watched> = JoinSet::new();
        self.rewatch(&mut watchers);

        let exit = loop {
            self.advance_frontier();
            self.dispatch_ready(&mut running);
            if running.is_empty() && watchers.is_empty() {
                break Exit::Drained;
            }

            tokio::select! {
                _ = cancel.cancelled() => break Exit::Cancelled,
                _ = wait_until(deadline) => break Exit::TimedOut,
                Some(joined) = running.join_next(), if !running.is_empty() => match joined {
                    Ok((idx, outcome)) => {
                        self.apply_outcome(idx, outcome, &mut running, &mut watchers).await
                    }
                    Err(e) => warn!("Dispatch ended abnormally: {}", e),
                },
                Some(joined) = watchers.join_next(), if !watchers.is_empty() => match joined {
                    Ok((idx, approval_id, resolution)) => {
                        self.apply_resolution(idx, approval_id, resolution, &mut watchers)
                    }
                    Err(e) => warn!("Approval watcher ended abnormally: {}", e),
                },
            }
        };

        // Dropping the join sets aborts in-flight dispatches.
        drop(running);
        drop(watchers);
        match exit {
            Exit::Drained => self.settle(),
            Exit::Cancelled => self.cancel_remaining().await,
            Exit::TimedOut => self.time_out(),
        }
    }

    /// Pick up approvals a restored board was already waiting on.
    fn rewatch(&self, watchers: &mut JoinSet<Watched>) {
        let waiting: Vec<(usize, Option<String>)> = {
            let board = self.board.read();
            board
                .indices_with(TaskStatus::WaitingApproval)
                .into_iter()
                .map(|idx| (idx, board.tasks[idx].approval_id.clone()))
                .collect()
        };
        for (idx, approval_id) in waiting {
            match approval_id {
                Some(approval_id) => {
                    debug!("Watching approval {} again", approval_id);
                    self.watch(idx, approval_id, watchers);
                }
                None => self.fail(idx, "waiting for approval without a request id".to_string()),
            }
        }
    }

    /// Promote pending tasks whose dependencies are satisfied and skip those
    /// that can no longer run, until nothing changes.
    fn advance_frontier(&self) {
        let mut board = self.board.write();
        loop {
            let mut changed = false;
            for idx in board.indices_with(TaskStatus::Pending) {
                match self.readiness(&board, idx) {
                    Readiness::Waiting => {}
                    Readiness::Blocked(reason) => {
                        board.tasks[idx].notes.push(reason);
                        changed |= board.transition(idx, TaskStatus::Skipped);
                    }
                    Readiness::Satisfied(degraded) => {
                        for name in degraded {
                            board.tasks[idx].notes.push(format!("degraded dependency: {}", name));
                        }
                        changed |= board.transition(idx, TaskStatus::Ready);
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn readiness(&self, board: &TaskBoard, idx: usize) -> Readiness {
        let mut degraded = Vec::new();
        let mut waiting = false;
        for &dep in &self.deps[idx] {
            let dep_task = &board.tasks[dep];
            match dep_task.status {
                TaskStatus::Succeeded => {}
                TaskStatus::Failed if dep_task.optional => degraded.push(dep_task.name.clone()),
                TaskStatus::Failed => {
                    return Readiness::Blocked(format!("dependency {} failed", dep_task.name));
                }
                TaskStatus::Skipped => {
                    return Readiness::Blocked(format!("dependency {} skipped", dep_task.name));
                }
                _ => waiting = true,
            }
        }
        if waiting {
            Readiness::Waiting
        } else {
            Readiness::Satisfied(degraded)
        }
    }

    /// Dispatch ready tasks by priority, then insertion order, up to the
    /// concurrency limit.
    fn dispatch_ready(&self, running: &mut JoinSet<Dispatched>) {
        let mut board = self.board.write();
        let mut ready = board.indices_with(TaskStatus::Ready);
        ready.sort_by_key(|&i| (Reverse(board.tasks[i].priority), i));

        for idx in ready {
            if running.len() >= self.max_concurrency {
                break;
            }
            let invocation = self.invocation_for(&board, idx);
            let timeout = self.timeout_of(&board, idx);
            if !board.transition(idx, TaskStatus::Running) {
                continue;
            }
            info!(
                "Dispatching task {} to agent {} (workflow {})",
                board.tasks[idx].id, self.agents[idx].id, board.workflow_id
            );
            self.spawn_attempt(idx, invocation, timeout, Duration::ZERO, running);
        }
    }

    fn timeout_of(&self, board: &TaskBoard, idx: usize) -> Duration {
        board.tasks[idx]
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.task_timeout)
    }

    fn spawn_attempt(
        &self,
        idx: usize,
        invocation: TaskInvocation,
        timeout: Duration,
        delay: Duration,
        running: &mut JoinSet<Dispatched>,
    ) {
        let agent = Arc::clone(&self.agents[idx]);
        let services = self.services.clone();
        running.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // The agent runs on its own task so a panic surfaces as a
            // JoinError instead of unwinding through the loop. Dropping
            // the handle aborts it, so a timed out or abandoned dispatch
            // stops at its next await point.
            let handle = AbortOnDropHandle::new(tokio::spawn(async move {
                agent.run(&invocation, &services).await
            }));
            let outcome = match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) if e.is_panic() => {
                    AgentOutcome::Failure("agent task panicked".to_string())
                }
                Ok(Err(e)) => AgentOutcome::Failure(format!("agent task aborted: {}", e)),
                Err(_) => AgentOutcome::Failure(format!("task timed out after {:?}", timeout)),
            };
            (idx, outcome)
        });
    }

    /// Run a failed task again after its backoff if its policy allows.
    /// The task stays `running` while it waits.
    fn retry(&self, idx: usize, reason: &str, running: &mut JoinSet<Dispatched>) -> bool {
        let mut board = self.board.write();
        let task = &mut board.tasks[idx];
        if task.status != TaskStatus::Running || !task.can_retry() {
            return false;
        }
        task.retry_count += 1;
        let retry = task.retry_count;
        let max = task.max_retries();
        let delay = task
            .retry
            .as_ref()
            .map_or(Duration::ZERO, |policy| policy.delay_for(retry));
        task.notes.push(format!("retry {}/{}: {}", retry, max, reason));
        warn!(
            "Task {} failed ({}), retry {}/{} in {:?}",
            task.id, reason, retry, max, delay
        );

        let invocation = self.invocation_for(&board, idx);
        let timeout = self.timeout_of(&board, idx);
        drop(board);
        self.spawn_attempt(idx, invocation, timeout, delay, running);
        true
    }

    fn invocation_for(&self, board: &TaskBoard, idx: usize) -> TaskInvocation {
        let task = &board.tasks[idx];

        let mut dependencies = serde_json::Map::new();
        for &dep in &self.deps[idx] {
            let dep_task = &board.tasks[dep];
            dependencies.insert(
                dep_task.name.clone(),
                dep_task.result.clone().unwrap_or(Value::Null),
            );
        }
        let mut context = json!({
            "workflow": {
                "id": board.workflow_id,
                "name": board.name,
                "inputs": board.inputs,
            },
            "dependencies": dependencies,
        });
        if !task.notes.is_empty() {
            context["notes"] = json!(task.notes);
        }

        let mut invocation = TaskInvocation::new(&task.id, &task.name, task.input.clone());
        invocation.description = task.description.clone();
        invocation.context = context;
        invocation.requires_approval = task.requires_approval;
        invocation.approval_granted = self.granted.contains(&idx);
        invocation
    }

    async fn apply_outcome(
        &self,
        idx: usize,
        outcome: AgentOutcome,
        running: &mut JoinSet<Dispatched>,
        watchers: &mut JoinSet<Watched>,
    ) {
        match outcome {
            AgentOutcome::Success { output, provider } => {
                let mut board = self.board.write();
                if board.transition(idx, TaskStatus::Succeeded) {
                    let task = &mut board.tasks[idx];
                    info!("Task {} succeeded", task.id);
                    task.result = Some(output);
                    task.provider = provider;
                }
            }
            AgentOutcome::Failure(reason) => {
                if !self.retry(idx, &reason, running) {
                    self.fail(idx, reason);
                }
            }
            AgentOutcome::NeedsApproval { action, payload } => {
                let requester = self.board.read().tasks[idx].id.clone();
                match self.approvals.submit(&action, payload, &requester).await {
                    Ok(approval_id) => {
                        {
                            let mut board = self.board.write();
                            if !board.transition(idx, TaskStatus::WaitingApproval) {
                                return;
                            }
                            board.tasks[idx].approval_id = Some(approval_id.clone());
                        }
                        info!("Task {} waiting for approval {}", requester, approval_id);
                        self.watch(idx, approval_id, watchers);
                    }
                    Err(e) => self.fail(idx, format!("approval request failed: {}", e)),
                }
            }
        }
    }

    fn apply_resolution(
        &mut self,
        idx: usize,
        approval_id: String,
        resolution: Result<Resolution, ApprovalError>,
        watchers: &mut JoinSet<Watched>,
    ) {
        match resolution {
            Ok(Resolution::StillPending) => {
                debug!("Approval {} still pending", approval_id);
                self.watch(idx, approval_id, watchers);
            }
            Ok(Resolution::Approved { comment }) => {
                let mut board = self.board.write();
                if board.transition(idx, TaskStatus::Ready) {
                    info!("Approval {} granted, resuming task {}", approval_id, board.tasks[idx].id);
                    let note = match comment {
                        Some(comment) => format!("approved: {}", comment),
                        None => "approved".to_string(),
                    };
                    board.tasks[idx].notes.push(note);
                    self.granted.insert(idx);
                }
            }
            Ok(Resolution::Rejected { comment }) => {
                let comment = comment.unwrap_or_else(|| "no comment".to_string());
                self.fail(idx, format!("approval rejected: {}", comment));
            }
            Err(e) => self.fail(idx, format!("approval lookup failed: {}", e)),
        }
    }

    fn watch(&self, idx: usize, approval_id: String, watchers: &mut JoinSet<Watched>) {
        let gate = Arc::clone(&self.approvals);
        let chunk = self.approval_wait_chunk;
        watchers.spawn(async move {
            let resolution = gate.await_resolution(&approval_id, chunk).await;
            (idx, approval_id, resolution)
        });
    }

    fn fail(&self, idx: usize, reason: String) {
        let mut board = self.board.write();
        if board.transition(idx, TaskStatus::Failed) {
            warn!("Task {} failed: {}", board.tasks[idx].id, reason);
            board.tasks[idx].error = Some(reason);
        }
    }

    fn settle(&self) -> WorkflowStatus {
        let mut board = self.board.write();
        for idx in 0..board.tasks.len() {
            match board.status_of(idx) {
                TaskStatus::Running => {
                    if board.transition(idx, TaskStatus::Failed) {
                        board.tasks[idx].error = Some("dispatch ended without a result".to_string());
                    }
                }
                TaskStatus::Pending | TaskStatus::Ready => {
                    board.tasks[idx].notes.push("never became runnable".to_string());
                    board.transition(idx, TaskStatus::Skipped);
                }
                _ => {}
            }
        }

        if board.tasks.iter().any(|t| t.status == TaskStatus::WaitingApproval) {
            WorkflowStatus::Partial
        } else if board
            .tasks
            .iter()
            .any(|t| t.status == TaskStatus::Failed && !t.optional)
        {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Completed
        }
    }

    /// Skip everything unfinished and reject the approvals nobody will act on.
    async fn cancel_remaining(&self) -> WorkflowStatus {
        let abandoned: Vec<String> = {
            let mut board = self.board.write();
            let mut abandoned = Vec::new();
            for idx in 0..board.tasks.len() {
                if board.status_of(idx).is_terminal() {
                    continue;
                }
                if board.status_of(idx) == TaskStatus::WaitingApproval {
                    abandoned.extend(board.tasks[idx].approval_id.clone());
                }
                board.tasks[idx].notes.push("cancelled".to_string());
                board.transition(idx, TaskStatus::Skipped);
            }
            info!("Workflow {} cancelled", board.workflow_id);
            abandoned
        };

        for approval_id in abandoned {
            let rejected = self
                .approvals
                .resolve(
                    &approval_id,
                    ApprovalDecision::Reject,
                    Some("workflow cancelled".to_string()),
                )
                .await;
            if let Err(e) = rejected {
                warn!("Could not withdraw approval {}: {}", approval_id, e);
            }
        }
        WorkflowStatus::Cancelled
    }

    /// Fail running tasks and skip the ones that never started. Tasks waiting
    /// for approval keep waiting, and so does everything downstream of them,
    /// which makes the workflow partial and resumable.
    fn time_out(&self) -> WorkflowStatus {
        let mut board = self.board.write();
        let held = self.held_by_approvals(&board);
        for idx in 0..board.tasks.len() {
            match board.status_of(idx) {
                TaskStatus::Running => {
                    if board.transition(idx, TaskStatus::Failed) {
                        board.tasks[idx].error = Some("workflow timed out".to_string());
                    }
                }
                TaskStatus::Pending if held.contains(&idx) => {}
                TaskStatus::Pending | TaskStatus::Ready => {
                    board.tasks[idx].notes.push("workflow timed out".to_string());
                    board.transition(idx, TaskStatus::Skipped);
                }
                _ => {}
            }
        }
        warn!("Workflow {} timed out", board.workflow_id);
        if board.indices_with(TaskStatus::WaitingApproval).is_empty() {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Partial
        }
    }

    /// Tasks waiting for approval plus the pending tasks that depend on them,
    /// directly or not.
    fn held_by_approvals(&self, board: &TaskBoard) -> HashSet<usize> {
        let mut held: HashSet<usize> = board
            .indices_with(TaskStatus::WaitingApproval)
            .into_iter()
            .collect();
        loop {
            let before = held.len();
            for idx in board.indices_with(TaskStatus::Pending) {
                if self.deps[idx].iter().any(|dep| held.contains(dep)) {
                    held.insert(idx);
                }
            }
            if held.len() == before {
                return held;
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
