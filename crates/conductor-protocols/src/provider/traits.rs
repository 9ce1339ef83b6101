//! LLM Provider trait definition.

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse};
use crate::error::ProviderError;

/// Core trait for LLM providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the provider ID used in model routes.
    fn id(&self) -> &str;

    /// Model used when a request does not name one.
    fn default_model(&self) -> &str;

    /// Generate a completion.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;
}
