//! Agent handlers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use conductor_engine::{AgentSummary, ChatMessage, TaskReport};

use crate::error::ApiError;
use crate::state::AppState;

/// Request to run an agent on a single task.
#[derive(Debug, Deserialize)]
pub struct AgentRunRequest {
    pub agent_id: String,

    /// Task text handed to the agent.
    pub task: String,

    /// Extra input merged into the task input when it is an object.
    #[serde(default)]
    pub context: Value,

    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct AgentsListResponse {
    pub count: usize,
    pub agents: Vec<AgentSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryQuery {
    /// Only the last N conversation messages.
    pub history: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MemoryResponse {
    pub memory: BTreeMap<String, Value>,
    pub conversation: Vec<ChatMessage>,
}

/// GET /agents
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<AgentsListResponse> {
    let agents = state.engine.agents().list();
    Json(AgentsListResponse {
        count: agents.len(),
        agents,
    })
}

/// POST /agents/run
pub async fn run_agent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AgentRunRequest>,
) -> Result<Json<TaskReport>, ApiError> {
    if req.task.trim().is_empty() {
        return Err(ApiError::BadRequest("task must not be empty".to_string()));
    }
    let report = state
        .engine
        .run_agent(
            &req.agent_id,
            &req.task,
            req.context,
            req.timeout_seconds.map(Duration::from_secs),
        )
        .await?;
    Ok(Json(report))
}

/// GET /agents/memory
pub async fn get_memory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MemoryQuery>,
) -> Json<MemoryResponse> {
    let memory = state.engine.memory();
    Json(MemoryResponse {
        memory: memory.snapshot(),
        conversation: memory.history(query.history),
    })
}
