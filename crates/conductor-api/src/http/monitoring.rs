//! Health check handler.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use conductor_gateway::ActiveModel;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but without a default model route or an approval store.
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Preferred provider of the default route and its model.
    pub active_model: Option<ActiveModel>,
    /// Default route providers in attempt order.
    pub providers: Vec<String>,
    pub tools: usize,
    pub agents: usize,
    pub workflows: usize,
    pub active_workflows: usize,
    /// `None` when the approval store could not be read.
    pub pending_approvals: Option<usize>,
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(health_report(&state).await)
}

/// Summary served by `/health`, also printed by the CLI.
pub async fn health_report(state: &AppState) -> HealthResponse {
    let engine = &state.engine;

    let pending_approvals = match engine.approvals().list_pending().await {
        Ok(pending) => Some(pending.len()),
        Err(e) => {
            warn!("Health check could not read approvals: {}", e);
            None
        }
    };
    let workflows = match engine.list_workflows().await {
        Ok(names) => names.len(),
        Err(e) => {
            warn!("Health check could not list workflows: {}", e);
            0
        }
    };

    let active_model = engine.gateway().active_model();
    let status = if active_model.is_some() && pending_approvals.is_some() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime().as_secs(),
        active_model,
        providers: engine.gateway().available_providers(),
        tools: state.tools.len(),
        agents: engine.agents().len(),
        workflows,
        active_workflows: engine.active_workflows().len(),
        pending_approvals,
    }
}
