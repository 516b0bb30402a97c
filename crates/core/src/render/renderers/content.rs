use super::{place, single_line, SlideRenderer, BODY_SPACING_PT};
use crate::outline::{ContentValue, SlideContent};
use crate::render::deck::{Alignment, DeckSlide, Paragraph};
use crate::render::style::{apply_background, resolve_alignment, resolve_font};
use crate::template::{FontConfig, Layout, PlaceholderKind, Template};

const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

/// Content slides: a heading plus body text boxes
pub struct ContentRenderer;

impl SlideRenderer for ContentRenderer {
    fn render(&self, slide: &mut DeckSlide, layout: &Layout, content: &SlideContent, template: &Template) {
        apply_background(slide, layout);

        for placeholder in &layout.placeholders {
            // image and chart regions stay empty
            if placeholder.kind.is_optional() {
                tracing::debug!(placeholder = %placeholder.id, kind = ?placeholder.kind, "Skipping media placeholder");
                continue;
            }
            let Some(value) = content.get(&placeholder.id).filter(|v| !v.is_empty()) else {
                tracing::debug!(placeholder = %placeholder.id, "No content for placeholder");
                continue;
            };

            if placeholder.id == "title" || placeholder.kind == PlaceholderKind::Title {
                let font = resolve_font(placeholder, template, "heading");
                single_line(slide, placeholder, value.as_text(), font);
                continue;
            }

            let font = resolve_font(placeholder, template, "body");
            let alignment = resolve_alignment(&placeholder.alignment);
            let paragraphs = match value {
                ContentValue::List(items) => list_paragraphs(items, alignment, font),
                other => body_paragraphs(&other.as_text(), alignment, font),
            };
            let text_box = place(slide, placeholder);
            for paragraph in paragraphs {
                text_box.push(paragraph);
            }
        }
    }
}

/// Split body text into paragraphs, one per line.
///
/// Lines starting with `•`, `-` or `*` become bullet paragraphs with the
/// marker removed. Blank lines become empty spacing paragraphs.
pub fn body_paragraphs(text: &str, alignment: Alignment, font: Option<&FontConfig>) -> Vec<Paragraph> {
    text.split('\n')
        .map(str::trim)
        .map(|line| {
            if line.is_empty() {
                return Paragraph::empty();
            }
            let paragraph = match line.strip_prefix(&BULLET_MARKERS[..]) {
                Some(rest) => Paragraph::new(rest.trim_start()).bulleted(),
                None => Paragraph::new(line),
            };
            paragraph
                .with_alignment(alignment)
                .with_space_after(BODY_SPACING_PT)
                .with_font(font)
        })
        .collect()
}

fn list_paragraphs(items: &[String], alignment: Alignment, font: Option<&FontConfig>) -> Vec<Paragraph> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| {
            let item = item.strip_prefix(&BULLET_MARKERS[..]).map_or(item, str::trim_start);
            Paragraph::new(item)
                .bulleted()
                .with_alignment(alignment)
                .with_space_after(BODY_SPACING_PT)
                .with_font(font)
        })
        .collect()
}
