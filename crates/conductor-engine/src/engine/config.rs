//! Engine runtime settings.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tasks dispatched at the same time, per workflow.
    pub max_concurrency: usize,
    /// Applied to tasks without their own timeout.
    pub task_timeout: Duration,
    /// Applied to workflows without their own timeout. `None` waits indefinitely.
    pub workflow_timeout: Option<Duration>,
    /// Length of each `await_resolution` call while a task waits for approval.
    pub approval_wait_chunk: Duration,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Entries the agent memory holds before evicting the oldest.
    pub memory_capacity: usize,
    /// TTL for memory entries stored without one.
    pub memory_ttl: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            task_timeout: Duration::from_secs(60),
            workflow_timeout: None,
            approval_wait_chunk: Duration::from_secs(5),
            event_capacity: 1024,
            memory_capacity: crate::memory::DEFAULT_MEMORY_CAPACITY,
            memory_ttl: None,
        }
    }
}
