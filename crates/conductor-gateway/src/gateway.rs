//! Model gateway with ordered fallback.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use conductor_core::ProviderRegistry;
use conductor_protocols::error::ProviderError;
use conductor_protocols::provider::{CompletionRequest, CompletionResponse};
use conductor_protocols::types::Message;

use crate::error::{GatewayError, ProviderFailure};
use crate::route::ModelRoute;

/// A completion tagged with the provider that served it.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub provider: String,
    pub model: String,
    pub response: CompletionResponse,
    /// Retryable failures that preceded the successful attempt.
    pub failures: Vec<ProviderFailure>,
}

impl GatewayResponse {
    pub fn text(&self) -> &str {
        self.response.text()
    }
}

/// Preferred provider of the process-wide route and its default model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveModel {
    pub provider: String,
    pub model: String,
}

/// Routes chat requests across providers.
///
/// One attempt per provider per call. Each attempt is bounded by the call
/// timeout, and running past it counts as a retryable failure.
pub struct ModelGateway {
    providers: Arc<ProviderRegistry>,
    default_route: Option<ModelRoute>,
    call_timeout: Duration,
}

impl ModelGateway {
    pub fn new(providers: Arc<ProviderRegistry>, call_timeout: Duration) -> Self {
        Self {
            providers,
            default_route: None,
            call_timeout,
        }
    }

    /// Set the process-wide route used by [`chat_default`](Self::chat_default).
    pub fn with_default_route(mut self, route: ModelRoute) -> Self {
        self.default_route = Some(route);
        self
    }

    pub fn default_route(&self) -> Option<&ModelRoute> {
        self.default_route.as_ref()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub fn providers(&self) -> &Arc<ProviderRegistry> {
        &self.providers
    }

    /// Chat against `preferred`, then each of `fallbacks` in order.
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        preferred: &str,
        fallbacks: &[String],
    ) -> Result<GatewayResponse, GatewayError> {
        let route = ModelRoute::new(preferred).with_fallbacks(fallbacks.iter().cloned());
        self.complete(CompletionRequest::new(messages), &route).await
    }

    /// Chat over the process-wide route.
    pub async fn chat_default(&self, messages: Vec<Message>) -> Result<GatewayResponse, GatewayError> {
        let route = self.default_route.as_ref().ok_or(GatewayError::NoProviders)?;
        self.complete(CompletionRequest::new(messages), route).await
    }

    /// Run a completion request over `route`.
    pub async fn complete(
        &self,
        request: CompletionRequest,
        route: &ModelRoute,
    ) -> Result<GatewayResponse, GatewayError> {
        let attempt_order = route.providers();
        if attempt_order.is_empty() {
            return Err(GatewayError::NoProviders);
        }

        let mut failures = Vec::new();
        for provider_id in attempt_order {
            let err = match self.attempt(provider_id, request.clone()).await {
                Ok(response) => {
                    info!(
                        "Provider {} served completion with model {} after {} failed attempt(s)",
                        provider_id,
                        response.model,
                        failures.len()
                    );
                    return Ok(GatewayResponse {
                        provider: provider_id.to_string(),
                        model: response.model.clone(),
                        response,
                        failures,
                    });
                }
                Err(err) => err,
            };

            let retryable = err.is_retryable();
            failures.push(ProviderFailure::new(provider_id, err.to_string(), retryable));

            if !retryable {
                error!("Provider {} failed with non-retryable error: {}", provider_id, err);
                return Err(GatewayError::NonRetryable {
                    provider: provider_id.to_string(),
                    reason: err.to_string(),
                    failures,
                });
            }
            warn!("Provider {} failed, trying next in route: {}", provider_id, err);
        }

        error!("All {} provider(s) in route failed", failures.len());
        Err(GatewayError::AllProvidersExhausted { failures })
    }

    async fn attempt(
        &self,
        provider_id: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let provider = self
            .providers
            .get(provider_id)
            .ok_or_else(|| ProviderError::NotFound(provider_id.to_string()))?;

        debug!("Requesting completion from {}", provider_id);
        match tokio::time::timeout(self.call_timeout, provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                after_ms: self.call_timeout.as_millis() as u64,
            }),
        }
    }

    /// Preferred provider of the default route and its default model.
    pub fn active_model(&self) -> Option<ActiveModel> {
        let route = self.default_route.as_ref()?;
        let provider_id = route.providers().first().copied()?;
        let model = self
            .providers
            .get(provider_id)
            .map(|p| p.default_model().to_string())
            .unwrap_or_default();
        Some(ActiveModel {
            provider: provider_id.to_string(),
            model,
        })
    }

    /// Provider ids of the default route, in attempt order.
    pub fn available_providers(&self) -> Vec<String> {
        self.default_route
            .as_ref()
            .map(|route| route.providers().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
