//! Workflow engine.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use conductor_approval::ApprovalGate;
use conductor_gateway::ModelGateway;

use super::board::TaskBoard;
use super::config::EngineConfig;
use super::events::{EngineEvent, WorkflowSnapshot};
use super::result::{TaskReport, WorkflowResult};
use super::run::WorkflowRun;
use crate::agent::{AgentRegistry, AgentServices};
use crate::error::WorkflowError;
use crate::memory::AgentMemory;
use crate::workflow::graph::dependency_indices;
use crate::workflow::{
    MemoryWorkflowStore, Task, TaskStatus, Workflow, WorkflowDefinition, WorkflowStatus,
    WorkflowStore, topological_order,
};

/// Per-run overrides.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the workflow's own timeout and the engine default.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Executes workflows against registered agents.
///
/// Registries, the gateway and the approval gate are injected at
/// construction. Every run gets its own task board, visible through
/// [`active_workflows`](Self::active_workflows) while it executes.
pub struct WorkflowEngine {
    agents: Arc<AgentRegistry>,
    services: AgentServices,
    approvals: Arc<ApprovalGate>,
    workflows: Arc<dyn WorkflowStore>,
    config: EngineConfig,
    events: broadcast::Sender<EngineEvent>,
    active: DashMap<String, Arc<RwLock<TaskBoard>>>,
    /// Partial runs, kept until resumed.
    suspended: DashMap<String, Workflow>,
    memory: Arc<AgentMemory>,
}

/// Removes a run from the active map when dropped, including when the
/// caller abandons the run future.
struct ActiveEntry<'a> {
    active: &'a DashMap<String, Arc<RwLock<TaskBoard>>>,
    workflow_id: String,
}

impl Drop for ActiveEntry<'_> {
    fn drop(&mut self) {
        self.active.remove(&self.workflow_id);
    }
}

impl WorkflowEngine {
    pub fn new(
        agents: Arc<AgentRegistry>,
        services: AgentServices,
        approvals: Arc<ApprovalGate>,
        config: EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let mut memory = AgentMemory::new(config.memory_capacity);
        if let Some(ttl) = config.memory_ttl {
            memory = memory.with_default_ttl(ttl);
        }
        Self {
            agents,
            services,
            approvals,
            workflows: Arc::new(MemoryWorkflowStore::new()),
            config,
            events,
            active: DashMap::new(),
            suspended: DashMap::new(),
            memory: Arc::new(memory),
        }
    }

    pub fn with_workflow_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.workflows = store;
        self
    }

    pub fn agents(&self) -> &Arc<AgentRegistry> {
        &self.agents
    }

    pub fn approvals(&self) -> &Arc<ApprovalGate> {
        &self.approvals
    }

    pub fn workflows(&self) -> &Arc<dyn WorkflowStore> {
        &self.workflows
    }

    pub fn memory(&self) -> &Arc<AgentMemory> {
        &self.memory
    }

    pub fn gateway(&self) -> &Arc<ModelGateway> {
        &self.services.gateway
    }

    pub fn services(&self) -> &AgentServices {
        &self.services
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Receive task transitions and workflow start/finish events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub async fn register_workflow(&self, definition: WorkflowDefinition) -> Result<(), WorkflowError> {
        self.workflows.save(definition).await
    }

    pub async fn list_workflows(&self) -> Result<Vec<String>, WorkflowError> {
        self.workflows.list().await
    }

    /// Check a workflow before any task runs.
    pub fn validate(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        self.validate_graph(workflow)?;
        if let Some(task) = workflow.tasks.iter().find(|t| t.status != TaskStatus::Pending) {
            return Err(WorkflowError::InvalidDefinition(format!(
                "task {} has already run (status {})",
                task.id, task.status
            )));
        }
        Ok(())
    }

    fn validate_graph(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        if workflow.tasks.is_empty() {
            return Err(WorkflowError::EmptyWorkflow(workflow.name.clone()));
        }
        dependency_indices(&workflow.tasks)?;
        for task in &workflow.tasks {
            if !self.agents.contains(&task.agent_id) {
                return Err(WorkflowError::UnregisteredAgent {
                    task: task.id.clone(),
                    agent: task.agent_id.clone(),
                });
            }
        }
        topological_order(&workflow.tasks)?;
        Ok(())
    }

    pub async fn execute(&self, workflow: Workflow) -> Result<WorkflowResult, WorkflowError> {
        self.execute_with(workflow, RunOptions::default()).await
    }

    /// Run a workflow to a terminal status.
    ///
    /// Configuration errors are returned before any task runs. Everything
    /// that goes wrong afterwards is reported through the result.
    pub async fn execute_with(
        &self,
        workflow: Workflow,
        options: RunOptions,
    ) -> Result<WorkflowResult, WorkflowError> {
        self.validate(&workflow)?;
        self.run(workflow, options).await
    }

    /// Continue a partial run once its approvals can land.
    ///
    /// Tasks that finished keep their results; tasks waiting for approval
    /// watch their existing requests again, and their dependents run once
    /// those are approved.
    pub async fn resume(
        &self,
        workflow_id: &str,
        options: RunOptions,
    ) -> Result<WorkflowResult, WorkflowError> {
        let (_, workflow) = self
            .suspended
            .remove(workflow_id)
            .ok_or_else(|| WorkflowError::NotSuspended(workflow_id.to_string()))?;
        match self.resume_workflow(workflow.clone(), options).await {
            Err(e) => {
                self.suspended.insert(workflow_id.to_string(), workflow);
                Err(e)
            }
            done => done,
        }
    }

    /// Continue a saved partial run, for example one restored from
    /// [`suspended_state`](Self::suspended_state) after a restart.
    pub async fn resume_workflow(
        &self,
        workflow: Workflow,
        options: RunOptions,
    ) -> Result<WorkflowResult, WorkflowError> {
        self.validate_graph(&workflow)?;
        if let Some(task) = workflow
            .tasks
            .iter()
            .find(|t| matches!(t.status, TaskStatus::Ready | TaskStatus::Running))
        {
            return Err(WorkflowError::InvalidDefinition(format!(
                "task {} was {} when the run stopped",
                task.id, task.status
            )));
        }
        if !workflow
            .tasks
            .iter()
            .any(|t| t.status == TaskStatus::WaitingApproval)
        {
            return Err(WorkflowError::NotSuspended(workflow.id));
        }
        info!("Resuming workflow {} ({})", workflow.name, workflow.id);
        self.run(workflow, options).await
    }

    /// Ids of partial runs that can be resumed, sorted.
    pub fn suspended_workflows(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.suspended.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn suspended_state(&self, workflow_id: &str) -> Option<Workflow> {
        self.suspended.get(workflow_id).map(|e| e.value().clone())
    }

    async fn run(&self, workflow: Workflow, options: RunOptions) -> Result<WorkflowResult, WorkflowError> {
        let deps = dependency_indices(&workflow.tasks)?;
        let agents = workflow
            .tasks
            .iter()
            .map(|task| {
                self.agents
                    .get(&task.agent_id)
                    .ok_or_else(|| WorkflowError::UnregisteredAgent {
                        task: task.id.clone(),
                        agent: task.agent_id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let deadline = options
            .timeout
            .or(workflow.timeout_secs.map(Duration::from_secs))
            .or(self.config.workflow_timeout)
            .map(|timeout| Instant::now() + timeout);
        let cancel = options.cancel.unwrap_or_default();

        let workflow_id = workflow.id.clone();
        let name = workflow.name.clone();
        let task_count = workflow.tasks.len();
        let started_at = Utc::now();

        let board = Arc::new(RwLock::new(TaskBoard::new(workflow, self.events.clone())));
        match self.active.entry(workflow_id.clone()) {
            Entry::Occupied(_) => return Err(WorkflowError::AlreadyRunning(workflow_id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&board));
            }
        }
        let _entry = ActiveEntry {
            active: &self.active,
            workflow_id: workflow_id.clone(),
        };

        info!("Starting workflow {} ({}) with {} task(s)", name, workflow_id, task_count);
        let _ = self.events.send(EngineEvent::WorkflowStarted {
            workflow_id: workflow_id.clone(),
            name: name.clone(),
            at: started_at,
        });

        let run = WorkflowRun {
            board: Arc::clone(&board),
            deps,
            agents,
            services: self.services.clone(),
            approvals: Arc::clone(&self.approvals),
            max_concurrency: self.config.max_concurrency.max(1),
            task_timeout: self.config.task_timeout,
            approval_wait_chunk: self.config.approval_wait_chunk,
            granted: HashSet::new(),
        };
        let status = run.drive(deadline, cancel).await;

        let result = {
            let mut board = board.write();
            board.status = status;
            if status == WorkflowStatus::Partial {
                self.suspended.insert(workflow_id.clone(), board.to_workflow());
            }
            WorkflowResult::from_board(&board, started_at)
        };

        let _ = self.events.send(EngineEvent::WorkflowFinished {
            workflow_id: workflow_id.clone(),
            status,
            at: result.finished_at,
        });
        match status {
            WorkflowStatus::Completed => info!(
                "Workflow {} ({}) completed in {} ms",
                name, workflow_id, result.duration_ms
            ),
            other => warn!("Workflow {} ({}) ended {}", name, workflow_id, other),
        }
        Ok(result)
    }

    /// Instantiate and run a workflow from the catalog.
    pub async fn run_named(
        &self,
        name: &str,
        inputs: Value,
        options: RunOptions,
    ) -> Result<WorkflowResult, WorkflowError> {
        let definition = self
            .workflows
            .load(name)
            .await?
            .ok_or_else(|| WorkflowError::WorkflowNotFound(name.to_string()))?;
        self.execute_with(definition.instantiate(inputs), options).await
    }

    /// Run one agent on a single ad hoc task.
    ///
    /// The task input is `context` (when it is an object) plus `task: text`.
    pub async fn run_agent(
        &self,
        agent_id: &str,
        text: &str,
        context: Value,
        timeout: Option<Duration>,
    ) -> Result<TaskReport, WorkflowError> {
        if !self.agents.contains(agent_id) {
            return Err(WorkflowError::AgentNotFound(agent_id.to_string()));
        }

        let (input, inputs) = match context {
            Value::Object(mut map) => {
                let inputs = Value::Object(map.clone());
                map.insert("task".to_string(), json!(text));
                (Value::Object(map), inputs)
            }
            Value::Null => (json!({ "task": text }), json!({})),
            other => (json!({ "task": text, "context": other }), json!({})),
        };

        let mut task = Task::new("adhoc", "adhoc", agent_id)
            .with_description(text)
            .with_input(input);
        task.timeout_secs = timeout.map(|t| t.as_secs().max(1));
        let workflow = Workflow::new(format!("adhoc:{}", agent_id))
            .with_inputs(inputs)
            .with_task(task);

        let options = RunOptions {
            timeout,
            cancel: None,
        };
        let result = self.execute_with(workflow, options).await?;
        let report = result
            .tasks
            .into_values()
            .next()
            .ok_or_else(|| WorkflowError::InvalidDefinition("ad hoc run produced no task".to_string()))?;

        self.memory.add_message("user", text);
        if let Some(output) = &report.result {
            self.memory
                .set(format!("last_result_{}", agent_id), output.clone());
            let reply = match output {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            self.memory.add_message("assistant", reply);
        }
        Ok(report)
    }

    /// Status maps of the workflows currently executing, sorted by id.
    pub fn active_workflows(&self) -> Vec<WorkflowSnapshot> {
        let mut snapshots: Vec<WorkflowSnapshot> = self
            .active
            .iter()
            .map(|entry| entry.value().read().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.workflow_id.cmp(&b.workflow_id));
        snapshots
    }

    pub fn workflow_snapshot(&self, workflow_id: &str) -> Option<WorkflowSnapshot> {
        self.active
            .get(workflow_id)
            .map(|entry| entry.value().read().snapshot())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
