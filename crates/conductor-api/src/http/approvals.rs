//! Approval handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use conductor_protocols::approval::{ApprovalDecision, ApprovalRequest};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListApprovalsQuery {
    #[serde(default)]
    pub all: bool,
}

/// Body of an approve or reject call.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DecisionRequest {
    pub comment: Option<String>,
    pub resolver: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalsListResponse {
    pub count: usize,
    pub approvals: Vec<ApprovalRequest>,
}

/// GET /approvals
pub async fn list_approvals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListApprovalsQuery>,
) -> Result<Json<ApprovalsListResponse>, ApiError> {
    let gate = state.engine.approvals();
    let approvals = if query.all {
        gate.list_all().await?
    } else {
        gate.list_pending().await?
    };
    Ok(Json(ApprovalsListResponse {
        count: approvals.len(),
        approvals,
    }))
}

/// GET /approvals/{id}
pub async fn get_approval(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApprovalRequest>, ApiError> {
    Ok(Json(state.engine.approvals().get(&id).await?))
}

/// POST /approvals/{id}/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<ApprovalRequest>, ApiError> {
    decide(&state, &id, ApprovalDecision::Approve, req).await
}

/// POST /approvals/{id}/reject
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<ApprovalRequest>, ApiError> {
    decide(&state, &id, ApprovalDecision::Reject, req).await
}

async fn decide(
    state: &AppState,
    id: &str,
    decision: ApprovalDecision,
    req: DecisionRequest,
) -> Result<Json<ApprovalRequest>, ApiError> {
    let resolved = state
        .engine
        .approvals()
        .resolve_as(id, decision, req.comment, req.resolver)
        .await?;
    Ok(Json(resolved))
}
