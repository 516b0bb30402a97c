//! Prompt templates bundled at compile time.
//!
//! Placeholders in braces are substituted by the builders below.

use crate::error::DeckResult;
use crate::outline::model::{Outline, OutlineDraft, SlideOutline};
use crate::template::TemplateSummary;

/// System prompt: schema, structural rules and layout vocabulary
pub const SYSTEM: &str = include_str!("defaults/system.md");

/// Outline request header
pub const OUTLINE: &str = include_str!("defaults/outline.md");

/// Rework an outline according to feedback
pub const REFINE: &str = include_str!("defaults/refine.md");

/// Enrich the content of a single slide
pub const EXPAND: &str = include_str!("defaults/expand.md");

/// Templates offered when the store cannot list any
const FALLBACK_RECOMMENDATIONS: &[(&str, &str)] = &[
    (
        "business_001",
        "business style, for company reports and project reviews",
    ),
    (
        "simple_001",
        "minimal style, for academic talks and technical sharing",
    ),
];

/// JSON schema of the outline the model must return
pub fn outline_schema() -> DeckResult<String> {
    let schema = schemars::schema_for!(OutlineDraft);
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// The system prompt with the outline schema filled in
pub fn system_prompt() -> DeckResult<String> {
    Ok(SYSTEM.replace("{schema}", &outline_schema()?))
}

/// Prompt for a fresh outline
pub fn outline_prompt(
    topic: &str,
    template_id: Option<&str>,
    author: Option<&str>,
    max_slides: usize,
    available: &[TemplateSummary],
) -> String {
    let mut parts = vec![OUTLINE.trim_end().replace("{topic}", topic)];

    if let Some(template_id) = template_id {
        parts.push(format!("Template: {}", template_id));
    }
    if let Some(author) = author {
        parts.push(format!("Author: {}", author));
    }

    parts.push(String::new());
    parts.push("Requirements:".to_string());
    parts.push(format!("- At most {} slides in total", max_slides));
    parts.push("- Slide 1 must be the cover (cover)".to_string());
    parts.push("- Slide 2 must be the table of contents (toc)".to_string());
    parts.push("- The last slide must be the ending (ending)".to_string());
    parts.push("- Content slides must be detailed, not superficial".to_string());
    parts.push("- Return the complete outline as JSON".to_string());

    if template_id.is_none() {
        parts.push(String::new());
        parts.push("Recommend a template that suits the topic:".to_string());
        if available.is_empty() {
            for (id, description) in FALLBACK_RECOMMENDATIONS {
                parts.push(format!("- {}: {}", id, description));
            }
        } else {
            for summary in available {
                let description = if summary.description.is_empty() {
                    summary.template_name.as_str()
                } else {
                    summary.description.as_str()
                };
                parts.push(format!("- {}: {}", summary.template_id, description));
            }
        }
    }

    parts.join("\n")
}

/// Prompt embedding the current outline and the verbatim feedback
pub fn refinement_prompt(current: &Outline, feedback: &str) -> DeckResult<String> {
    let outline = serde_json::to_string_pretty(current)?;
    Ok(REFINE
        .replace("{feedback}", feedback)
        .replace("{outline}", &outline))
}

/// Prompt asking for a richer version of one slide's content
pub fn expansion_prompt(slide: &SlideOutline) -> DeckResult<String> {
    let content = serde_json::to_string_pretty(&slide.content)?;
    Ok(EXPAND
        .replace("{slide_number}", &slide.slide_number.to_string())
        .replace("{layout_type}", &slide.layout_type)
        .replace("{content}", &content))
}
