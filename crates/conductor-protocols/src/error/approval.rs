//! Approval gate errors.

use thiserror::Error;

use crate::approval::ApprovalStatus;

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Approval request not found: {0}")]
    NotFound(String),

    #[error("Approval request {id} already resolved as {status}")]
    AlreadyResolved { id: String, status: ApprovalStatus },

    #[error("Approval request already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Approval store error: {0}")]
    Storage(String),
}
