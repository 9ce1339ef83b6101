//! Tool handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::Value;

use conductor_protocols::tool::{ToolContext, ToolDefinition};
use conductor_protocols::types::RiskLevel;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub risk_level: RiskLevel,
}

impl From<ToolDefinition> for ToolInfo {
    fn from(def: ToolDefinition) -> Self {
        Self {
            id: def.id,
            name: def.name,
            description: def.description,
            risk_level: def.risk_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolsListResponse {
    pub count: usize,
    pub tools: Vec<ToolInfo>,
}

#[derive(Debug, Serialize)]
pub struct ToolExecuteResponse {
    pub tool: String,
    pub result: Value,
}

/// GET /tools
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsListResponse> {
    let tools: Vec<ToolInfo> = state.tools.list().into_iter().map(ToolInfo::from).collect();
    Json(ToolsListResponse {
        count: tools.len(),
        tools,
    })
}

/// POST /tools/{name}/execute
///
/// The request body is the argument object.
pub async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(arguments): Json<Value>,
) -> Result<Json<ToolExecuteResponse>, ApiError> {
    let result = state
        .tools
        .invoke_with(&name, arguments, ToolContext::new("http"))
        .await?;
    Ok(Json(ToolExecuteResponse { tool: name, result }))
}
