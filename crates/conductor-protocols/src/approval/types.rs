//! Approval request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApprovalError;

/// Lifecycle status of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ApprovalError::Storage(format!(
                "unknown approval status `{}`",
                other
            ))),
        }
    }
}

/// A human decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    /// Terminal status this decision produces.
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl FromStr for ApprovalDecision {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Ok(Self::Approve),
            "reject" | "rejected" => Ok(Self::Reject),
            other => Err(ApprovalError::InvalidDecision(other.to_string())),
        }
    }
}

/// Outcome observed by a waiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Approved { comment: Option<String> },
    Rejected { comment: Option<String> },
    /// The wait timed out before anyone decided.
    StillPending,
}

impl Resolution {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::StillPending)
    }
}

/// A request for human sign-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: String,
    /// Action awaiting sign-off.
    pub action: String,
    /// Data the reviewer must see.
    pub payload: serde_json::Value,
    /// Task or agent that asked.
    pub requester: String,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
}

impl ApprovalRequest {
    /// Create a pending request with a fresh id.
    pub fn new(
        action: impl Into<String>,
        payload: serde_json::Value,
        requester: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action: action.into(),
            payload,
            requester: requester.into(),
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
            comment: None,
            resolver: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Current resolution as seen by a waiter.
    pub fn resolution(&self) -> Resolution {
        match self.status {
            ApprovalStatus::Pending => Resolution::StillPending,
            ApprovalStatus::Approved => Resolution::Approved {
                comment: self.comment.clone(),
            },
            ApprovalStatus::Rejected => Resolution::Rejected {
                comment: self.comment.clone(),
            },
        }
    }

    /// Apply a terminal update in place.
    pub fn apply(&mut self, update: &ApprovalUpdate) {
        self.status = update.status;
        self.resolved_at = Some(update.resolved_at);
        self.comment = update.comment.clone();
        self.resolver = update.resolver.clone();
    }
}

/// The single terminal write an approval request receives.
#[derive(Debug, Clone)]
pub struct ApprovalUpdate {
    pub status: ApprovalStatus,
    pub comment: Option<String>,
    pub resolver: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl ApprovalUpdate {
    pub fn new(decision: ApprovalDecision, comment: Option<String>, resolver: Option<String>) -> Self {
        Self {
            status: decision.status(),
            comment,
            resolver,
            resolved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
