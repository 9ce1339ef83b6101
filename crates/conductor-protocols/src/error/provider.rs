//! LLM Provider errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider not found: {0}")]
    NotFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Context length exceeded: {used} tokens used, {max} tokens allowed")]
    ContextLengthExceeded { used: usize, max: usize },

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {after_ms} ms")]
    Timeout { after_ms: u64 },
}

/// HTTP statuses that indicate a transient upstream condition. 529 is the
/// "overloaded" status some vendors use.
const TRANSIENT_STATUSES: [u16; 6] = [429, 500, 502, 503, 504, 529];

impl ProviderError {
    /// Map an HTTP error status and body to a provider error.
    pub fn from_api_response(status: u16, message: String) -> Self {
        let lower = message.to_lowercase();
        match status {
            401 | 403 => Self::AuthenticationFailed(message),
            429 => Self::RateLimited {
                retry_after_seconds: 0,
            },
            404 => Self::ModelNotFound(message),
            400 | 413 | 422 if mentions_context_length(&lower) => {
                Self::ContextLengthExceeded { used: 0, max: 0 }
            }
            400 | 422 if mentions_content_filter(&lower) => Self::ContentFiltered(message),
            400 | 422 => Self::InvalidRequest(message),
            _ => Self::ApiError { status, message },
        }
    }

    /// Whether another provider may succeed where this one failed.
    ///
    /// Credential problems, malformed requests and filtered content would fail
    /// identically everywhere, so they are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::ModelNotFound(_)
            | Self::RateLimited { .. }
            | Self::ContextLengthExceeded { .. }
            | Self::Network(_)
            | Self::Timeout { .. } => true,
            Self::ApiError { status, .. } => TRANSIENT_STATUSES.contains(status),
            Self::AuthenticationFailed(_) | Self::InvalidRequest(_) | Self::ContentFiltered(_) => {
                false
            }
        }
    }

    pub fn is_context_length_error(&self) -> bool {
        matches!(self, Self::ContextLengthExceeded { .. })
    }
}

fn mentions_context_length(lower: &str) -> bool {
    lower.contains("context length")
        || lower.contains("too many tokens")
        || (lower.contains("token") && lower.contains("exceed"))
}

fn mentions_content_filter(lower: &str) -> bool {
    lower.contains("content filter") || lower.contains("safety") || lower.contains("policy")
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
