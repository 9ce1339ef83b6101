//! Anthropic provider implementation.

use async_trait::async_trait;
use tracing::debug;

use conductor_protocols::error::ProviderError;
use conductor_protocols::provider::{CompletionRequest, CompletionResponse, LLMProvider};
use conductor_protocols::types::Message;

use crate::api::{ApiRequest, ApiResponse, error_message};
use crate::converter::convert_messages;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Provider speaking the Anthropic messages API.
pub struct AnthropicProvider {
    id: String,
    api_key: String,
    api_url: String,
    default_model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api_key: api_key.into(),
            api_url: messages_url(DEFAULT_BASE_URL),
            default_model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_url = messages_url(base_url);
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        let (system, messages) = convert_messages(&request.messages);
        ApiRequest {
            model: request.model_or(&self.default_model).to_string(),
            messages,
            system,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_api_response(status, error_message(&body)));
        }

        Ok(response)
    }
}

fn messages_url(base_url: &str) -> String {
    format!("{}/messages", base_url.trim_end_matches('/'))
}

fn parse_response(api_response: ApiResponse, requested_model: &str) -> CompletionResponse {
    let text = api_response.text();
    let model = if api_response.model.is_empty() {
        requested_model.to_string()
    } else {
        api_response.model
    };

    CompletionResponse {
        id: api_response.id,
        model,
        message: Message::assistant(text),
        finish_reason: api_response.stop_reason,
        usage: api_response.usage.map(Into::into).unwrap_or_default(),
        metadata: Default::default(),
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(&request);
        debug!("POST {} model={}", self.api_url, api_request.model);

        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(parse_response(api_response, &api_request.model))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
