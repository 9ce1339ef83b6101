//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use conductor_core::ToolRegistry;
use conductor_engine::WorkflowEngine;

/// Shared by every handler.
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub tools: Arc<ToolRegistry>,
    start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<WorkflowEngine>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            engine,
            tools,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
