use super::{single_line, SlideRenderer};
use crate::outline::SlideContent;
use crate::render::deck::DeckSlide;
use crate::render::style::{apply_background, resolve_font};
use crate::template::{Layout, PlaceholderKind, Template};

/// Title slide: one line per placeholder with content
pub struct CoverRenderer;

impl SlideRenderer for CoverRenderer {
    fn render(&self, slide: &mut DeckSlide, layout: &Layout, content: &SlideContent, template: &Template) {
        apply_background(slide, layout);

        for placeholder in &layout.placeholders {
            let Some(text) = content.text(&placeholder.id) else {
                tracing::debug!(placeholder = %placeholder.id, "No cover content, skipping");
                continue;
            };
            let role = if placeholder.kind == PlaceholderKind::Title {
                "title"
            } else {
                "subtitle"
            };
            single_line(slide, placeholder, text, resolve_font(placeholder, template, role));
        }
    }
}
