//! Gemini provider implementation.

use async_trait::async_trait;
use tracing::debug;

use conductor_protocols::error::ProviderError;
use conductor_protocols::provider::{CompletionRequest, CompletionResponse, LLMProvider};
use conductor_protocols::types::Message;

use crate::types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, error_message};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Provider speaking the Gemini `generateContent` API.
pub struct GeminiProvider {
    id: String,
    api_key: String,
    base_url: String,
    default_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn url_for(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let model = request.model_or(&self.default_model).to_string();
        let body = GenerateContentRequest::from_messages(
            &request.messages,
            GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        );
        let url = self.url_for(&model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::from_api_response(status.as_u16(), error_message(&text)));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::ApiError {
                status: 502,
                message: format!("Failed to parse response: {}", e),
            })?;
        let candidate = parsed
            .candidates
            .first()
            .ok_or_else(|| ProviderError::ApiError {
                status: 502,
                message: "response contained no candidates".to_string(),
            })?;

        Ok(CompletionResponse {
            id: String::new(),
            model: parsed.model_version.clone().unwrap_or(model),
            message: Message::assistant(candidate.text()),
            finish_reason: candidate.finish_reason.clone(),
            usage: parsed.usage_metadata.clone().map(Into::into).unwrap_or_default(),
            metadata: Default::default(),
        })
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
