//! # Outlines
//!
//! The outline model, the bundled prompts and the LLM-backed generator.

pub mod generator;
pub mod model;
pub mod prompts;

pub use generator::{OutlineGenerator, OutlineRequest};
pub use model::{
    ContentValue, Outline, OutlineDraft, OutlineMetadata, SlideContent, SlideOutline,
};
