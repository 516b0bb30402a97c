//! # Deckforge Models
//!
//! LLM provider selection. `ModelConfig` names a provider and model and
//! builds the matching [`LlmClient`].

use crate::error::{DeckError, DeckResult};
use crate::llm::{AnthropicClient, LlmClient, OpenAiClient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Supported LLM providers
///
/// - Anthropic (Claude) - `ANTHROPIC_API_KEY`
/// - OpenAI (GPT) - `OPENAI_API_KEY`
/// - DeepSeek - `DEEPSEEK_API_KEY`, served through the OpenAI-compatible client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    DeepSeek,
}

impl LlmProvider {
    /// Get all available providers
    pub fn all() -> Vec<LlmProvider> {
        vec![
            LlmProvider::Anthropic,
            LlmProvider::OpenAI,
            LlmProvider::DeepSeek,
        ]
    }

    /// Display name for the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::DeepSeek => "DeepSeek",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }

    /// Whether this provider supports custom base URL
    pub fn supports_base_url(&self) -> bool {
        matches!(self, LlmProvider::OpenAI | LlmProvider::DeepSeek)
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LlmProvider {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "openai" | "gpt" => Ok(LlmProvider::OpenAI),
            "deepseek" => Ok(LlmProvider::DeepSeek),
            other => Err(DeckError::validation(format!(
                "unsupported LLM provider: {}",
                other
            ))),
        }
    }
}

/// Configuration for LLM model selection
///
/// ## Example
/// ```rust,ignore
/// use deckforge_core::models::{ModelConfig, LlmProvider};
///
/// let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
/// let llm = config.create_llm()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// LLM provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "claude-sonnet-4-20250514", "gpt-4o")
    pub model: String,
    /// Optional base URL override for OpenAI-compatible APIs
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::for_provider(LlmProvider::default())
    }
}

impl ModelConfig {
    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
        }
    }

    /// Provider with its default model
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self::with_provider(provider, provider.default_model())
    }

    /// Set base URL (for OpenAI-compatible endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Create an LLM client, reading the API key from the provider's variable
    pub fn create_llm(&self) -> DeckResult<Arc<dyn LlmClient>> {
        let key_var = self.provider.api_key_env();
        let api_key = std::env::var(key_var).map_err(|_| {
            DeckError::llm(format!(
                "{} API key not configured (set {})",
                self.provider, key_var
            ))
        })?;
        self.create_llm_with_key(api_key)
    }

    /// Create an LLM client with an explicit API key
    pub fn create_llm_with_key(&self, api_key: impl Into<String>) -> DeckResult<Arc<dyn LlmClient>> {
        let api_key = api_key.into();
        match self.provider {
            LlmProvider::Anthropic => {
                let mut client = AnthropicClient::new(api_key, &self.model)?;
                if let Some(base_url) = &self.base_url {
                    client = client.with_base_url(base_url);
                }
                Ok(Arc::new(client))
            }
            LlmProvider::OpenAI => {
                let llm = if let Some(base_url) = &self.base_url {
                    OpenAiClient::new(api_key, &self.model)?.with_base_url(base_url)
                } else {
                    OpenAiClient::new(api_key, &self.model)?
                };
                Ok(Arc::new(llm))
            }
            LlmProvider::DeepSeek => {
                let base_url = self.base_url.as_deref().unwrap_or(DEEPSEEK_BASE_URL);
                Ok(Arc::new(
                    OpenAiClient::new(api_key, &self.model)?.with_base_url(base_url),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert!(config.model.contains("claude"));
    }

    #[test]
    fn test_provider_display_names() {
        assert_eq!(LlmProvider::Anthropic.display_name(), "Anthropic");
        assert_eq!(LlmProvider::OpenAI.to_string(), "OpenAI");
        assert_eq!(LlmProvider::all().len(), 3);
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("deepseek".parse::<LlmProvider>().unwrap(), LlmProvider::DeepSeek);
        assert!("gemini".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_base_url_support() {
        assert!(LlmProvider::OpenAI.supports_base_url());
        assert!(!LlmProvider::Anthropic.supports_base_url());
    }

    #[test]
    fn test_model_config_serialization() {
        let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("openai"));
        assert!(json.contains("gpt-4o"));
    }

    #[test]
    fn test_create_llm_with_key() {
        let llm = ModelConfig::for_provider(LlmProvider::DeepSeek)
            .create_llm_with_key("key")
            .unwrap();
        assert_eq!(llm.model(), "deepseek-chat");

        let llm = ModelConfig::with_provider(LlmProvider::Anthropic, "claude-test")
            .create_llm_with_key("key")
            .unwrap();
        assert_eq!(llm.model(), "claude-test");

        assert!(ModelConfig::default().create_llm_with_key("").is_err());
    }
}
