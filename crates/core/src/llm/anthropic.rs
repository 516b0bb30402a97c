//! Anthropic messages API client.

use super::{parse_json_response, CompletionRequest, LlmClient, REQUEST_TIMEOUT};
use crate::error::{DeckError, DeckResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Appended to the system prompt for structured output
const JSON_INSTRUCTION: &str = "\n\nYou must respond with valid JSON only. \
Do not include any text before or after the JSON object.";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> DeckResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DeckError::llm("Anthropic API key not configured"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeckError::llm(format!("failed to create HTTP client: {}", e)))?;
        let model = model.into();
        tracing::info!(model = %model, "Initialized Anthropic client");
        Ok(Self {
            http,
            api_key,
            model,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn body(&self, request: &CompletionRequest, system: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": system,
            "messages": [{"role": "user", "content": request.prompt}],
        })
    }

    async fn complete(&self, request: &CompletionRequest, system: &str) -> DeckResult<String> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(model = %self.model, "Calling Anthropic messages API");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(request, system))
            .send()
            .await
            .map_err(|e| DeckError::llm(format!("Anthropic API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Anthropic API error");
            return Err(DeckError::llm(format!(
                "Anthropic API returned {}: {}",
                status, detail
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DeckError::llm(format!("unreadable Anthropic response: {}", e)))?;
        let content = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| DeckError::llm("Anthropic response contained no text"))?;

        tracing::info!(chars = content.len(), "Generated text from Anthropic");
        Ok(content)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, request: &CompletionRequest) -> DeckResult<String> {
        let system = request.system_prompt.as_deref().unwrap_or_default();
        self.complete(request, system).await
    }

    async fn generate_structured(
        &self,
        request: &CompletionRequest,
    ) -> DeckResult<serde_json::Value> {
        let system = format!(
            "{}{}",
            request.system_prompt.as_deref().unwrap_or_default(),
            JSON_INSTRUCTION
        );
        let content = self.complete(request, &system).await?;
        parse_json_response(&content)
    }
}
