//! # Conductor API
//!
//! HTTP adapter over the workflow engine, tool registry and approval gate.
//! Handlers only marshal requests; every decision is made by the core crates.
//!
//! ```text
//! /workflows          GET  list      /workflows/{name}/run  POST run
//! /agents             GET  list      /agents/run            POST ad hoc task
//! /tools              GET  list      /tools/{name}/execute  POST invoke
//! /approvals          GET  pending   /approvals/{id}        GET
//! /approvals/{id}/approve  POST      /approvals/{id}/reject POST
//! /health             GET
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::monitoring::{HealthResponse, HealthStatus, health_report};
pub use http::routes::create_router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
