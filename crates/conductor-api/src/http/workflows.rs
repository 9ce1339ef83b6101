//! Workflow handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use conductor_engine::{RunOptions, WorkflowResult, WorkflowSnapshot};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunWorkflowRequest {
    pub inputs: Value,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResumeRequest {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowsListResponse {
    pub count: usize,
    pub workflows: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ActiveWorkflowsResponse {
    pub count: usize,
    pub workflows: Vec<WorkflowSnapshot>,
}

fn run_options(timeout_seconds: Option<u64>) -> RunOptions {
    match timeout_seconds {
        Some(secs) => RunOptions::new().with_timeout(Duration::from_secs(secs)),
        None => RunOptions::new(),
    }
}

/// GET /workflows
pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorkflowsListResponse>, ApiError> {
    let workflows = state.engine.list_workflows().await?;
    Ok(Json(WorkflowsListResponse {
        count: workflows.len(),
        workflows,
    }))
}

/// POST /workflows/{name}/run
///
/// Blocks until the run settles. Failed and partial runs are still `200`;
/// the outcome is in the result's `status`.
pub async fn run_workflow(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<RunWorkflowRequest>,
) -> Result<Json<WorkflowResult>, ApiError> {
    info!("HTTP run request for workflow {}", name);
    let options = run_options(req.timeout_seconds);
    let result = state.engine.run_named(&name, req.inputs, options).await?;
    Ok(Json(result))
}

/// GET /workflows/active
pub async fn list_active(State(state): State<Arc<AppState>>) -> Json<ActiveWorkflowsResponse> {
    let workflows = state.engine.active_workflows();
    Json(ActiveWorkflowsResponse {
        count: workflows.len(),
        workflows,
    })
}

/// GET /workflows/active/{id}
pub async fn get_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowSnapshot>, ApiError> {
    state
        .engine
        .workflow_snapshot(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Workflow {} is not running", id)))
}

/// GET /workflows/suspended
pub async fn list_suspended(State(state): State<Arc<AppState>>) -> Json<WorkflowsListResponse> {
    let workflows = state.engine.suspended_workflows();
    Json(WorkflowsListResponse {
        count: workflows.len(),
        workflows,
    })
}

/// POST /workflows/suspended/{id}/resume
pub async fn resume_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<WorkflowResult>, ApiError> {
    info!("HTTP resume request for workflow {}", id);
    let result = state.engine.resume(&id, run_options(req.timeout_seconds)).await?;
    Ok(Json(result))
}
