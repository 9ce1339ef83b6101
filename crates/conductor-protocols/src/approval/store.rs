//! Approval store trait.

use async_trait::async_trait;

use super::{ApprovalRequest, ApprovalStatus, ApprovalUpdate};
use crate::error::ApprovalError;

/// Durable storage for approval requests.
///
/// Implementations must make `create` and `resolve_if_pending` atomic per
/// request id: concurrent resolutions of one request see exactly one winner.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Persist a new request. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, request: &ApprovalRequest) -> Result<(), ApprovalError>;

    /// Load a request by id.
    async fn get(&self, id: &str) -> Result<Option<ApprovalRequest>, ApprovalError>;

    /// List requests, optionally filtered by status, oldest first.
    async fn list(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ApprovalRequest>, ApprovalError>;

    /// Apply `update` only if the request is still pending.
    ///
    /// Fails with `NotFound` for unknown ids and `AlreadyResolved` when the
    /// request has left `pending`.
    async fn resolve_if_pending(
        &self,
        id: &str,
        update: ApprovalUpdate,
    ) -> Result<ApprovalRequest, ApprovalError>;
}
