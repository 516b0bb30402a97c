//! OpenAI-compatible chat completions client (also used for DeepSeek).

use super::{parse_json_response, CompletionRequest, LlmClient, REQUEST_TIMEOUT};
use crate::error::{DeckError, DeckResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> DeckResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DeckError::llm("OpenAI API key not configured"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeckError::llm(format!("failed to create HTTP client: {}", e)))?;
        let model = model.into();
        tracing::info!(model = %model, "Initialized OpenAI client");
        Ok(Self {
            http,
            api_key,
            model,
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn body(&self, request: &CompletionRequest, json_mode: bool) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }

    async fn complete(&self, request: &CompletionRequest, json_mode: bool) -> DeckResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %self.model, json_mode, "Calling chat completions API");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.body(request, json_mode))
            .send()
            .await
            .map_err(|e| DeckError::llm(format!("OpenAI API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, "OpenAI API error");
            return Err(DeckError::llm(format!(
                "OpenAI API returned {}: {}",
                status, detail
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DeckError::llm(format!("unreadable OpenAI response: {}", e)))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DeckError::llm("OpenAI response contained no content"))?;

        tracing::info!(chars = content.len(), "Generated text from OpenAI");
        Ok(content)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, request: &CompletionRequest) -> DeckResult<String> {
        self.complete(request, false).await
    }

    async fn generate_structured(
        &self,
        request: &CompletionRequest,
    ) -> DeckResult<serde_json::Value> {
        let content = self.complete(request, true).await?;
        parse_json_response(&content)
    }
}
