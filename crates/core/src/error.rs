//! # Deckforge Errors
//!
//! One error type for the whole engine. Lower layers raise the specific
//! variants; the agent normalizes everything into [`DeckError::Agent`].

use crate::pipeline::PipelineStage;

pub type DeckResult<T> = Result<T, DeckError>;

#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    #[error("template '{template_id}' not found at {path}")]
    TemplateNotFound { template_id: String, path: String },

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("llm api error: {0}")]
    Llm(String),

    #[error("outline generation failed: {0}")]
    OutlineGeneration(String),

    #[error("presentation rendering failed: {0}")]
    Render(String),

    #[error("presentation {stage} failed: {message}")]
    Agent {
        stage: PipelineStage,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    pub fn template_not_found(template_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::TemplateNotFound {
            template_id: template_id.into(),
            path: path.into(),
        }
    }

    pub fn invalid_template(msg: impl Into<String>) -> Self {
        Self::InvalidTemplate(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn outline_generation(msg: impl Into<String>) -> Self {
        Self::OutlineGeneration(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Wrap any lower-level failure into the single user-facing error.
    pub fn agent(stage: PipelineStage, cause: &DeckError) -> Self {
        Self::Agent {
            stage,
            message: cause.to_string(),
        }
    }

    /// True for failures at the LLM boundary (transport, auth, unparseable output).
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::Llm(_))
    }

    /// True for schema or invariant violations raised while building a model.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Json(_))
    }
}
