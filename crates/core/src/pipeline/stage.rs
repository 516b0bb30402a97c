//! # Pipeline Stages
//!
//! Defines the stages a presentation request moves through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading a previously saved outline
    OutlineLoading,
    /// Asking the LLM for a fresh outline
    OutlineGeneration,
    /// Asking the LLM to rework an existing outline
    OutlineRefinement,
    /// Loading and checking the resolved template
    TemplateValidation,
    /// Rendering and writing the document
    Rendering,
    /// Writing the outline JSON next to the document
    OutlineSaving,
    /// Complete
    Complete,
    /// Failed
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::OutlineLoading => "outline loading",
            PipelineStage::OutlineGeneration => "outline generation",
            PipelineStage::OutlineRefinement => "outline refinement",
            PipelineStage::TemplateValidation => "template validation",
            PipelineStage::Rendering => "rendering",
            PipelineStage::OutlineSaving => "outline saving",
            PipelineStage::Complete => "completion",
            PipelineStage::Failed => "failure",
        };
        f.write_str(label)
    }
}

/// The pipeline state machine
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Current stage
    pub stage: PipelineStage,
}

impl Pipeline {
    /// Pipeline for `generate_presentation`
    pub fn for_generation() -> Self {
        Self {
            stage: PipelineStage::OutlineGeneration,
        }
    }

    /// Pipeline for `refine_presentation`
    pub fn for_refinement() -> Self {
        Self {
            stage: PipelineStage::OutlineLoading,
        }
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            PipelineStage::OutlineLoading => PipelineStage::OutlineRefinement,
            PipelineStage::OutlineGeneration => PipelineStage::TemplateValidation,
            PipelineStage::OutlineRefinement => PipelineStage::TemplateValidation,
            PipelineStage::TemplateValidation => PipelineStage::Rendering,
            PipelineStage::Rendering => PipelineStage::OutlineSaving,
            PipelineStage::OutlineSaving => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        };
    }

    /// Skip the optional outline-saving stage
    pub fn finish(&mut self) {
        if self.stage != PipelineStage::Failed {
            self.stage = PipelineStage::Complete;
        }
    }

    /// Fail the pipeline, remembering where it stopped
    pub fn fail(&mut self) -> PipelineStage {
        let at = self.stage;
        self.stage = PipelineStage::Failed;
        at
    }
}
