//! Gateway errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failed attempt in a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
    pub retryable: bool,
}

impl ProviderFailure {
    pub fn new(provider: impl Into<String>, reason: impl Into<String>, retryable: bool) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
            retryable,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("No providers configured for this route")]
    NoProviders,

    #[error("All providers exhausted: {}", summarize(.failures))]
    AllProvidersExhausted { failures: Vec<ProviderFailure> },

    /// The trail includes the aborting failure as its last entry.
    #[error(
        "Provider {provider} failed with a non-retryable error: {reason} (attempts: {})",
        summarize(.failures)
    )]
    NonRetryable {
        provider: String,
        reason: String,
        failures: Vec<ProviderFailure>,
    },
}

impl GatewayError {
    /// Per-provider failure trail, in attempt order.
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::NoProviders => &[],
            Self::AllProvidersExhausted { failures } | Self::NonRetryable { failures, .. } => {
                failures
            }
        }
    }
}

fn summarize(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display_lists_providers_in_order() {
        let err = GatewayError::AllProvidersExhausted {
            failures: vec![
                ProviderFailure::new("p1", "Timeout after 50 ms", true),
                ProviderFailure::new("p2", "Rate limited: retry after 3 seconds", true),
            ],
        };
        let display = err.to_string();
        let p1 = display.find("p1").unwrap();
        let p2 = display.find("p2").unwrap();
        assert!(p1 < p2);
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_non_retryable_display_includes_trail() {
        let err = GatewayError::NonRetryable {
            provider: "p2".to_string(),
            reason: "Authentication failed: bad key".to_string(),
            failures: vec![
                ProviderFailure::new("p1", "Network error: reset", true),
                ProviderFailure::new("p2", "Authentication failed: bad key", false),
            ],
        };
        let display = err.to_string();
        assert!(display.contains("p1: Network error: reset"));
        assert!(display.contains("non-retryable"));
    }

    #[test]
    fn test_no_providers_has_empty_trail() {
        assert!(GatewayError::NoProviders.failures().is_empty());
    }
}
