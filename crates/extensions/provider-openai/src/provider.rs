//! OpenAI-compatible provider implementation.

use async_trait::async_trait;
use tracing::debug;

use conductor_protocols::error::ProviderError;
use conductor_protocols::provider::{CompletionRequest, CompletionResponse, LLMProvider};
use conductor_protocols::types::Message;

use crate::api::{ApiMessage, ApiRequest, ApiResponse, error_message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Provider speaking the OpenAI chat completions protocol.
pub struct OpenAICompatibleProvider {
    id: String,
    api_key: Option<String>,
    api_url: String,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAICompatibleProvider {
    pub fn new(id: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            id: id.into(),
            api_key,
            api_url: chat_url(DEFAULT_BASE_URL),
            default_model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at another OpenAI-compatible API root, e.g. `http://localhost:11434/v1`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_url = chat_url(base_url);
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: request.model_or(&self.default_model).to_string(),
            messages: request.messages.iter().map(ApiMessage::from).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ProviderError> {
        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(api_request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();

            return Err(match ProviderError::from_api_response(status, error_message(&text)) {
                ProviderError::RateLimited { .. } => ProviderError::RateLimited {
                    retry_after_seconds: retry_after.unwrap_or(0),
                },
                other => other,
            });
        }

        Ok(response)
    }
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn parse_response(api_response: ApiResponse, requested_model: &str) -> Result<CompletionResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ApiError {
            status: 502,
            message: "response contained no choices".to_string(),
        })?;

    let model = if api_response.model.is_empty() {
        requested_model.to_string()
    } else {
        api_response.model
    };

    Ok(CompletionResponse {
        id: api_response.id,
        model,
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        finish_reason: choice.finish_reason,
        usage: api_response.usage.map(Into::into).unwrap_or_default(),
        metadata: Default::default(),
    })
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
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
        parse_response(api_response, &api_request.model)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
