//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::http::{agents, approvals, monitoring, tools, workflows};
use crate::state::AppState;

/// Create the API router.
///
/// ## Route Structure
///
/// ```text
/// /workflows
///   GET    /workflows             - Registered workflow names
///   POST   /workflows/{name}/run  - Run a workflow to completion
///   GET    /workflows/active      - Task status maps of running workflows
///   GET    /workflows/active/{id} - One running workflow
///   GET    /workflows/suspended   - Partial runs waiting to be resumed
///   POST   /workflows/suspended/{id}/resume
///
/// /agents
///   GET    /agents                - Registered agents
///   POST   /agents/run            - Run one agent on an ad hoc task
///   GET    /agents/memory         - Agent memory and conversation (?history=N)
///
/// /tools
///   GET    /tools                 - Registered tools
///   POST   /tools/{name}/execute  - Invoke a tool directly
///
/// /approvals
///   GET    /approvals             - Pending requests (?all=true for every request)
///   GET    /approvals/{id}        - One request
///   POST   /approvals/{id}/approve
///   POST   /approvals/{id}/reject
///
/// /health                         - Service summary
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let workflow_routes = Router::new()
        .route("/", get(workflows::list_workflows))
        .route("/{name}/run", post(workflows::run_workflow))
        .route("/active", get(workflows::list_active))
        .route("/active/{id}", get(workflows::get_active))
        .route("/suspended", get(workflows::list_suspended))
        .route("/suspended/{id}/resume", post(workflows::resume_workflow))
        .with_state(state.clone());

    let agent_routes = Router::new()
        .route("/", get(agents::list_agents))
        .route("/run", post(agents::run_agent))
        .route("/memory", get(agents::get_memory))
        .with_state(state.clone());

    let tool_routes = Router::new()
        .route("/", get(tools::list_tools))
        .route("/{name}/execute", post(tools::execute_tool))
        .with_state(state.clone());

    let approval_routes = Router::new()
        .route("/", get(approvals::list_approvals))
        .route("/{id}", get(approvals::get_approval))
        .route("/{id}/approve", post(approvals::approve))
        .route("/{id}/reject", post(approvals::reject))
        .with_state(state.clone());

    let monitoring_routes = Router::new()
        .route("/health", get(monitoring::health_check))
        .with_state(state);

    Router::new()
        .nest("/workflows", workflow_routes)
        .nest("/agents", agent_routes)
        .nest("/tools", tool_routes)
        .nest("/approvals", approval_routes)
        .merge(monitoring_routes)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
