//! # LLM Capability
//!
//! The text-generation boundary. The outline generator only sees
//! [`LlmClient`]; concrete HTTP clients live in the submodules and are
//! created through [`crate::models::ModelConfig::create_llm`].

mod anthropic;
mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

use crate::error::{DeckError, DeckResult};
use async_trait::async_trait;
use std::time::Duration;

/// Request timeout for provider calls
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A language model that turns prompts into text
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier, recorded in outline metadata
    fn model(&self) -> &str;

    /// Free-form text completion
    async fn generate_text(&self, request: &CompletionRequest) -> DeckResult<String>;

    /// Completion parsed as a JSON value
    async fn generate_structured(
        &self,
        request: &CompletionRequest,
    ) -> DeckResult<serde_json::Value> {
        let text = self.generate_text(request).await?;
        parse_json_response(&text)
    }
}

/// Remove a surrounding Markdown code fence, if any
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse a model response as JSON. Failures are capability errors.
pub fn parse_json_response(text: &str) -> DeckResult<serde_json::Value> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse JSON response");
        DeckError::llm(format!("invalid JSON response: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_json_response() {
        assert_eq!(
            parse_json_response("```json\n{\"title\": \"X\"}\n```").unwrap(),
            json!({"title": "X"})
        );

        let err = parse_json_response("Sure! Here is your outline").unwrap_err();
        assert!(err.is_capability());
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("hi")
            .with_system("sys")
            .with_temperature(0.2)
            .with_max_tokens(100);
        assert_eq!(request.system_prompt.as_deref(), Some("sys"));
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 100);
    }
}
