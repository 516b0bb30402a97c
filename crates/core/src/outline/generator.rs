//! # Outline Generator
//!
//! Turns a topic into a checked [`Outline`] by prompting the language model,
//! with a bounded retry loop. Also reworks existing outlines from feedback
//! and enriches single slides.

use crate::config::Settings;
use crate::error::{DeckError, DeckResult};
use crate::llm::{CompletionRequest, LlmClient};
use crate::outline::model::{Outline, OutlineDraft, SlideContent};
use crate::outline::prompts;
use crate::template::{TemplateStore, DEFAULT_TEMPLATE_ID};
use std::sync::Arc;

/// Parameters for a fresh outline
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineRequest {
    pub topic: String,
    /// Explicit template; must exist in the store
    pub template_id: Option<String>,
    pub author: Option<String>,
    pub max_slides: Option<usize>,
    pub temperature: Option<f64>,
    /// Generation attempts (at least one is always made)
    pub retries: u32,
}

impl OutlineRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            template_id: None,
            author: None,
            max_slides: None,
            temperature: None,
            retries: 3,
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = Some(max_slides);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Why a single generation attempt failed
#[derive(Debug)]
enum AttemptFailure {
    /// Transport, provider or unparseable model output
    Capability(DeckError),
    /// JSON shape or outline invariants
    Structural(DeckError),
    Unexpected(DeckError),
}

impl AttemptFailure {
    fn classify(err: DeckError) -> Self {
        if err.is_capability() {
            AttemptFailure::Capability(err)
        } else if err.is_structural() {
            AttemptFailure::Structural(err)
        } else {
            AttemptFailure::Unexpected(err)
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AttemptFailure::Capability(_) => "capability",
            AttemptFailure::Structural(_) => "structural",
            AttemptFailure::Unexpected(_) => "unexpected",
        }
    }

    fn cause(&self) -> &DeckError {
        match self {
            AttemptFailure::Capability(e)
            | AttemptFailure::Structural(e)
            | AttemptFailure::Unexpected(e) => e,
        }
    }

    /// Final error once every attempt has been used
    fn exhausted(self, attempts: u32) -> DeckError {
        match self {
            AttemptFailure::Capability(e) => DeckError::outline_generation(format!(
                "LLM API failed after {} attempts: {}",
                attempts, e
            )),
            AttemptFailure::Structural(e) => {
                DeckError::outline_generation(format!("failed to generate valid outline: {}", e))
            }
            AttemptFailure::Unexpected(e) => DeckError::outline_generation(e.to_string()),
        }
    }
}

pub struct OutlineGenerator {
    llm: Arc<dyn LlmClient>,
    store: Arc<TemplateStore>,
    max_slides: usize,
    temperature: f64,
    max_tokens: u32,
}

impl OutlineGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<TemplateStore>) -> Self {
        let defaults = Settings::default();
        Self {
            llm,
            store,
            max_slides: defaults.max_slides,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    /// Take slide ceiling, temperature and token limit from settings
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.max_slides = settings.max_slides;
        self.temperature = settings.temperature;
        self.max_tokens = settings.max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    fn completion(&self, prompt: String, temperature: f64) -> DeckResult<CompletionRequest> {
        Ok(CompletionRequest::new(prompt)
            .with_system(prompts::system_prompt()?)
            .with_temperature(temperature)
            .with_max_tokens(self.max_tokens))
    }

    /// Generate a new outline for a topic
    pub async fn generate(&self, request: &OutlineRequest) -> DeckResult<Outline> {
        let max_slides = request.max_slides.unwrap_or(self.max_slides);
        let temperature = request.temperature.unwrap_or(self.temperature);
        let preview: String = request.topic.chars().take(50).collect();
        tracing::info!(topic = %preview, "Generating outline");

        // An explicitly requested template must exist; no fallback
        if let Some(template_id) = &request.template_id {
            self.store.load(template_id).await?;
        }

        let available = match request.template_id {
            Some(_) => Vec::new(),
            None => self.store.list().await.unwrap_or_default(),
        };
        let prompt = prompts::outline_prompt(
            &request.topic,
            request.template_id.as_deref(),
            request.author.as_deref(),
            max_slides,
            &available,
        );
        let completion = self.completion(prompt, temperature)?;

        let attempts = request.retries.max(1);
        let mut last_failure = None;
        for attempt in 1..=attempts {
            tracing::debug!(attempt, attempts, "Generation attempt");
            match self.draft(&completion, &request.topic, temperature).await {
                Ok(mut outline) => {
                    match &request.template_id {
                        Some(template_id) => outline.template_id = template_id.clone(),
                        None => self.resolve_recommended(&mut outline).await,
                    }
                    tracing::info!(
                        outline_id = %outline.outline_id,
                        slides = outline.slides().len(),
                        "Generated outline"
                    );
                    return Ok(outline);
                }
                Err(err) => {
                    let failure = AttemptFailure::classify(err);
                    tracing::warn!(
                        attempt,
                        kind = failure.label(),
                        error = %failure.cause(),
                        "Outline attempt failed"
                    );
                    last_failure = Some(failure);
                }
            }
        }

        Err(match last_failure {
            Some(failure) => failure.exhausted(attempts),
            None => DeckError::outline_generation(format!(
                "failed to generate outline after {} attempts",
                attempts
            )),
        })
    }

    /// One model call turned into a checked outline
    async fn draft(
        &self,
        completion: &CompletionRequest,
        prompt: &str,
        temperature: f64,
    ) -> DeckResult<Outline> {
        let value = self.llm.generate_structured(completion).await?;
        let draft: OutlineDraft = serde_json::from_value(value)?;
        draft.into_outline(self.llm.model(), prompt, temperature)
    }

    /// Replace an unknown recommended template with the default
    async fn resolve_recommended(&self, outline: &mut Outline) {
        if let Err(e) = self.store.load(&outline.template_id).await {
            tracing::warn!(
                template_id = %outline.template_id,
                error = %e,
                "Recommended template not found, using default"
            );
            outline.template_id = DEFAULT_TEMPLATE_ID.to_string();
        }
    }

    /// Rework an outline from feedback, keeping its identifier
    pub async fn refine(
        &self,
        current: &Outline,
        feedback: &str,
        temperature: Option<f64>,
    ) -> DeckResult<Outline> {
        let preview: String = feedback.chars().take(50).collect();
        tracing::info!(outline_id = %current.outline_id, feedback = %preview, "Refining outline");

        let temperature = temperature.unwrap_or(self.temperature);
        let result: DeckResult<Outline> = async {
            let prompt = prompts::refinement_prompt(current, feedback)?;
            let completion = self.completion(prompt, temperature)?;
            let origin = format!("{} (refined: {})", current.metadata.prompt, feedback);
            self.draft(&completion, &origin, temperature).await
        }
        .await;

        match result {
            Ok(mut refined) => {
                refined.outline_id = current.outline_id.clone();
                tracing::info!(outline_id = %refined.outline_id, "Refined outline");
                Ok(refined)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refine outline");
                Err(DeckError::outline_generation(format!(
                    "outline refinement failed: {}",
                    e
                )))
            }
        }
    }

    /// Ask the model for richer content on one slide
    pub async fn expand_slide(
        &self,
        outline: &Outline,
        slide_number: u32,
        temperature: Option<f64>,
    ) -> DeckResult<Outline> {
        let temperature = temperature.unwrap_or(self.temperature);
        tracing::info!(outline_id = %outline.outline_id, slide_number, "Expanding slide");

        let result: DeckResult<Outline> = async {
            let slide = outline.slide(slide_number).ok_or_else(|| {
                DeckError::validation(format!("outline has no slide {}", slide_number))
            })?;
            let prompt = prompts::expansion_prompt(slide)?;
            let completion = self.completion(prompt, temperature)?;
            let value = self.llm.generate_structured(&completion).await?;
            let content: SlideContent = serde_json::from_value(unwrap_content(value))?;
            outline.with_slide_content(slide_number, content)
        }
        .await;

        result.map_err(|e| {
            tracing::error!(error = %e, "Failed to expand slide");
            DeckError::outline_generation(format!("slide expansion failed: {}", e))
        })
    }
}

/// Accept either a bare content object or one wrapped in `{"content": {...}}`
fn unwrap_content(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("content") => {
            match map.remove("content") {
                Some(inner @ serde_json::Value::Object(_)) => inner,
                Some(other) => {
                    map.insert("content".to_string(), other);
                    serde_json::Value::Object(map)
                }
                None => serde_json::Value::Object(map),
            }
        }
        other => other,
    }
}
