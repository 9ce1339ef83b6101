//! Approval gate: submit, resolve and await human decisions.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

use conductor_protocols::approval::{
    ApprovalDecision, ApprovalRequest, ApprovalStatus, ApprovalStore, ApprovalUpdate, Resolution,
};
use conductor_protocols::error::ApprovalError;

/// Resolver recorded when the caller does not identify themselves.
pub const DEFAULT_RESOLVER: &str = "operator";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Tracks pending approval requests on top of a durable store.
///
/// Waiters in this process are woken as soon as [`resolve`](Self::resolve)
/// commits. They also re-read the store every poll interval, which picks up
/// resolutions written by another process sharing the same database.
pub struct ApprovalGate {
    store: Arc<dyn ApprovalStore>,
    waiters: DashMap<String, Arc<Notify>>,
    poll_interval: Duration,
}

impl ApprovalGate {
    pub fn new(store: Arc<dyn ApprovalStore>) -> Self {
        Self {
            store,
            waiters: DashMap::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Persist a new pending request and return its id without waiting.
    pub async fn submit(
        &self,
        action: &str,
        payload: serde_json::Value,
        requester: &str,
    ) -> Result<String, ApprovalError> {
        let request = ApprovalRequest::new(action, payload, requester);
        self.store.create(&request).await?;
        info!("Approval {} requested by {} for {}", request.id, requester, action);
        Ok(request.id)
    }

    /// Resolve a pending request as the default resolver.
    pub async fn resolve(
        &self,
        id: &str,
        decision: ApprovalDecision,
        comment: Option<String>,
    ) -> Result<ApprovalRequest, ApprovalError> {
        self.resolve_as(id, decision, comment, None).await
    }

    /// Resolve a pending request, recording who decided.
    ///
    /// Fails with `NotFound` for unknown ids and `AlreadyResolved` when the
    /// request has left `pending`; the stored decision is never overwritten.
    pub async fn resolve_as(
        &self,
        id: &str,
        decision: ApprovalDecision,
        comment: Option<String>,
        resolver: Option<String>,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let resolver = resolver.unwrap_or_else(|| DEFAULT_RESOLVER.to_string());
        let update = ApprovalUpdate::new(decision, comment, Some(resolver));
        let resolved = self.store.resolve_if_pending(id, update).await?;

        info!(
            "Approval {} {} by {}",
            id,
            resolved.status,
            resolved.resolver.as_deref().unwrap_or(DEFAULT_RESOLVER)
        );
        if let Some((_, notify)) = self.waiters.remove(id) {
            notify.notify_waiters();
        }
        Ok(resolved)
    }

    /// Wait up to `timeout` for a decision.
    ///
    /// Returns [`Resolution::StillPending`] when the time runs out, so callers
    /// can check again later.
    pub async fn await_resolution(&self, id: &str, timeout: Duration) -> Result<Resolution, ApprovalError> {
        let deadline = Instant::now() + timeout;
        let notify = self
            .waiters
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone();

        let outcome = loop {
            // Register interest before reading the store so a resolve landing
            // between the read and the wait is not missed.
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let request = match self.store.get(id).await {
                Ok(Some(request)) => request,
                Ok(None) => break Err(ApprovalError::NotFound(id.to_string())),
                Err(e) => break Err(e),
            };
            if !request.is_pending() {
                break Ok(request.resolution());
            }

            let now = Instant::now();
            if now >= deadline {
                debug!("Approval {} still pending after {:?}", id, timeout);
                break Ok(Resolution::StillPending);
            }
            let wait = (deadline - now).min(self.poll_interval);
            let _ = tokio::time::timeout(wait, notified).await;
        };

        self.release_waiter(id, &notify);
        outcome
    }

    // Drop the shared notifier once no other waiter holds it.
    fn release_waiter(&self, id: &str, notify: &Arc<Notify>) {
        self.waiters
            .remove_if(id, |_, current| Arc::ptr_eq(current, notify) && Arc::strong_count(current) <= 2);
    }

    /// Look up a request by id.
    pub async fn get(&self, id: &str) -> Result<ApprovalRequest, ApprovalError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))
    }

    /// Pending requests, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        self.store.list(Some(ApprovalStatus::Pending)).await
    }

    /// Every request, oldest first.
    pub async fn list_all(&self) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        self.store.list(None).await
    }

    pub fn store(&self) -> &Arc<dyn ApprovalStore> {
        &self.store
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
