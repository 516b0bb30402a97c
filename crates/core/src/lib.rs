//! # Deckforge Core
//!
//! The engine behind Deckforge: turns a topic into a slide deck by asking
//! a language model for a structured outline and rendering that outline
//! through a JSON template into an Office Open XML presentation.
//!
//! ## Architecture
//!
//! - `template/` - template records, the cached store and validation
//! - `outline/` - the outline model, prompts and the LLM-backed generator
//! - `render/` - slide renderers, the assembler and the `.pptx` writer
//! - `pipeline/` - the [`DeckAgent`] orchestrator and its stages
//! - `llm` / `models` - provider clients and their configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use deckforge_core::{DeckAgent, GenerateRequest, Settings};
//!
//! let agent = DeckAgent::new(Settings::from_env()?).await?;
//! let files = agent
//!     .generate_presentation(GenerateRequest::new("Quarterly business review"))
//!     .await?;
//! println!("{}", files.deck_path.display());
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod outline;
pub mod pipeline;
pub mod render;
pub mod template;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use error::{DeckError, DeckResult};
pub use models::{LlmProvider, ModelConfig};
pub use outline::{Outline, OutlineGenerator, OutlineRequest};
pub use pipeline::{DeckAgent, GenerateRequest, GeneratedFiles, PipelineStage};
pub use render::PresentationAssembler;
pub use template::{Template, TemplateStore, TemplateSummary};
