//! # Template Validator
//!
//! Fail-fast completeness checks run by the agent before rendering, plus a
//! soft check of slide content against a layout.

use crate::error::{DeckError, DeckResult};
use crate::outline::SlideContent;
use crate::template::model::{LayoutKind, Template};

pub struct TemplateValidator;

impl TemplateValidator {
    /// Check that a template can render a full outline. Never mutates.
    pub fn validate(template: &Template) -> DeckResult<()> {
        tracing::debug!(template_id = %template.template_id, "Validating template");

        for (kind, name) in [
            (LayoutKind::Cover, "cover"),
            (LayoutKind::TableOfContents, "table_of_contents"),
            (LayoutKind::Ending, "ending"),
        ] {
            if !template.has_layout_kind(kind) {
                return Err(DeckError::validation(format!(
                    "missing required layout type: {}",
                    name
                )));
            }
        }

        if template.content_layout_keys().next().is_none() {
            return Err(DeckError::validation(
                "template must have at least one content layout",
            ));
        }

        for (name, color) in template.theme.colors.entries() {
            if color.as_str().is_empty() {
                return Err(DeckError::validation(format!(
                    "missing required color: {}",
                    name
                )));
            }
        }

        if template.theme.fonts.is_empty() {
            return Err(DeckError::validation("template must define fonts"));
        }

        tracing::info!(template_id = %template.template_id, "Template validated");
        Ok(())
    }

    /// Check slide content against a layout and return the ids of text
    /// placeholders left without content. Missing text is only a warning.
    pub fn validate_layout_content(
        layout_key: &str,
        content: &SlideContent,
        template: &Template,
    ) -> DeckResult<Vec<String>> {
        let layout = template.layout(layout_key).ok_or_else(|| {
            DeckError::validation(format!("layout '{}' not found in template", layout_key))
        })?;

        let mut missing = Vec::new();
        for placeholder in &layout.placeholders {
            if placeholder.kind.is_optional() {
                continue;
            }
            if !content.contains(&placeholder.id) {
                tracing::warn!(
                    placeholder = %placeholder.id,
                    layout = layout_key,
                    "Missing content for placeholder"
                );
                missing.push(placeholder.id.clone());
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::business_template;
    use serde_json::json;

    #[test]
    fn test_bundled_template_is_valid() {
        assert!(TemplateValidator::validate(&business_template()).is_ok());
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let template = business_template();
        let before = template.clone();
        TemplateValidator::validate(&template).unwrap();
        assert_eq!(template, before);
    }

    #[test]
    fn test_missing_fonts_rejected() {
        let mut template = business_template();
        template.theme.fonts.clear();
        let err = TemplateValidator::validate(&template).unwrap_err();
        assert!(err.to_string().contains("fonts"));
    }

    #[test]
    fn test_missing_ending_rejected() {
        let mut template = business_template();
        template.layouts.remove("ending");
        let err = TemplateValidator::validate(&template).unwrap_err();
        assert!(err.to_string().contains("ending"));
    }

    #[test]
    fn test_layout_content_check() {
        let template = business_template();
        let content: SlideContent =
            serde_json::from_value(json!({"title": "Overview"})).unwrap();

        // missing body text only warns
        let missing =
            TemplateValidator::validate_layout_content("content_single", &content, &template)
                .unwrap();
        assert_eq!(missing, vec!["content".to_string()]);
        assert!(
            TemplateValidator::validate_layout_content("content_grid", &content, &template)
                .is_err()
        );
    }
}
