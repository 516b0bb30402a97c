//! # Pipeline
//!
//! The request orchestrator and the stages it moves through.

pub mod agent;
pub mod stage;

pub use agent::{DeckAgent, GenerateRequest, GeneratedFiles};
pub use stage::{Pipeline, PipelineStage};
