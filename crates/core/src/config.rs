//! # Settings
//!
//! Runtime configuration read from `DECKFORGE_*` environment variables.
//! The CLI loads `.env` before calling [`Settings::from_env`].

use crate::error::{DeckError, DeckResult};
use crate::models::{LlmProvider, ModelConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Provider and model used for outline generation
    pub model: ModelConfig,
    /// Directory holding `{template_id}.json` records
    pub template_dir: PathBuf,
    /// Default destination for generated documents
    pub output_dir: PathBuf,
    /// Slide ceiling passed to the model
    pub max_slides: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Generation attempts before giving up
    pub retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            template_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("output"),
            max_slides: 50,
            temperature: 0.7,
            max_tokens: 4000,
            retries: 3,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> DeckResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DeckResult<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model = match get("DECKFORGE_PROVIDER") {
            Some(provider) => {
                let provider: LlmProvider = provider.parse()?;
                ModelConfig::for_provider(provider)
            }
            None => defaults.model,
        };
        let model = match get("DECKFORGE_MODEL") {
            Some(name) => ModelConfig { model: name, ..model },
            None => model,
        };
        let model = match get("DECKFORGE_BASE_URL") {
            Some(url) => model.with_base_url(url),
            None => model,
        };

        Ok(Self {
            model,
            template_dir: get("DECKFORGE_TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            output_dir: get("DECKFORGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_slides: parse_var("DECKFORGE_MAX_SLIDES", get("DECKFORGE_MAX_SLIDES"))?
                .unwrap_or(defaults.max_slides),
            temperature: parse_var("DECKFORGE_TEMPERATURE", get("DECKFORGE_TEMPERATURE"))?
                .unwrap_or(defaults.temperature),
            max_tokens: parse_var("DECKFORGE_MAX_TOKENS", get("DECKFORGE_MAX_TOKENS"))?
                .unwrap_or(defaults.max_tokens),
            retries: parse_var("DECKFORGE_RETRIES", get("DECKFORGE_RETRIES"))?
                .unwrap_or(defaults.retries),
        })
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>) -> DeckResult<Option<T>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| DeckError::validation(format!("{} has invalid value '{}'", key, raw)))
        })
        .transpose()
}
