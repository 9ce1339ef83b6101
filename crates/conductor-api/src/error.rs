//! API errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use conductor_engine::WorkflowError;
use conductor_protocols::error::{ApprovalError, ToolError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        if matches!(err, WorkflowError::AlreadyRunning(_)) {
            Self::Conflict(err.to_string())
        } else if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_configuration() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::NotFound(_) => Self::NotFound(err.to_string()),
            ApprovalError::AlreadyResolved { .. } | ApprovalError::AlreadyExists(_) => {
                Self::Conflict(err.to_string())
            }
            ApprovalError::InvalidDecision(_) => Self::BadRequest(err.to_string()),
            ApprovalError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(_) => Self::NotFound(err.to_string()),
            ToolError::InvalidArguments(_) => Self::BadRequest(err.to_string()),
            ToolError::ExecutionFailed(_) | ToolError::Timeout(_) => Self::Internal(err.to_string()),
        }
    }
}
