use super::{place, single_line, SlideRenderer, CONTENTS_SPACING_PT};
use crate::outline::SlideContent;
use crate::render::deck::{DeckSlide, Paragraph};
use crate::render::style::{apply_background, resolve_alignment, resolve_font};
use crate::template::{Layout, Template};

pub const DEFAULT_CONTENTS_TITLE: &str = "Contents";

/// Table of contents: a title line and numbered entries
pub struct ContentsRenderer;

impl SlideRenderer for ContentsRenderer {
    fn render(&self, slide: &mut DeckSlide, layout: &Layout, content: &SlideContent, template: &Template) {
        apply_background(slide, layout);

        for placeholder in &layout.placeholders {
            match placeholder.id.as_str() {
                "title" => {
                    let title = content
                        .text("title")
                        .unwrap_or_else(|| DEFAULT_CONTENTS_TITLE.to_string());
                    single_line(slide, placeholder, title, resolve_font(placeholder, template, "title"));
                }
                "items" => {
                    let items: Vec<String> = content
                        .items("items")
                        .into_iter()
                        .map(|item| item.trim().to_string())
                        .collect();
                    if items.is_empty() {
                        tracing::warn!("Table of contents has no items");
                        continue;
                    }
                    let font = resolve_font(placeholder, template, "body");
                    let alignment = resolve_alignment(&placeholder.alignment);
                    let text_box = place(slide, placeholder);
                    for (index, item) in items.iter().enumerate() {
                        text_box.push(
                            Paragraph::new(format!("{}. {}", index + 1, item))
                                .with_alignment(alignment)
                                .with_space_after(CONTENTS_SPACING_PT)
                                .with_font(font),
                        );
                    }
                }
                other => tracing::debug!(placeholder = other, "Unhandled contents placeholder"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::Canvas;
    use crate::testing::business_template;

    fn render(content: &SlideContent) -> DeckSlide {
        let template = business_template();
        let mut slide = DeckSlide::new(Canvas::WIDESCREEN);
        ContentsRenderer.render(&mut slide, template.layout("toc").unwrap(), content, &template);
        slide
    }

    #[test]
    fn test_numbered_entries() {
        let items = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let slide = render(&SlideContent::new().with("items", items));

        assert_eq!(slide.text_boxes.len(), 2);
        assert_eq!(slide.text_boxes[0].text(), DEFAULT_CONTENTS_TITLE);
        let entries = &slide.text_boxes[1].paragraphs;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "1. A");
        assert_eq!(entries[2].text, "3. C");
        assert!(entries.iter().all(|p| p.space_after == Some(CONTENTS_SPACING_PT)));
    }

    #[test]
    fn test_blank_items_keep_their_number() {
        let items = vec!["A".to_string(), String::new(), "B".to_string()];
        let slide = render(&SlideContent::new().with("items", items));

        let entries = &slide.text_boxes[1].paragraphs;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "1. A");
        assert_eq!(entries[2].text, "3. B");
    }

    #[test]
    fn test_title_uses_placeholder_font() {
        let slide = render(&SlideContent::new().with("title", "Agenda"));
        assert_eq!(slide.text_boxes.len(), 1);
        assert_eq!(slide.text_boxes[0].text(), "Agenda");
        let font = slide.text_boxes[0].paragraphs[0].font.as_ref().unwrap();
        assert_eq!(font.size, 32);
    }

    #[test]
    fn test_text_items_split_by_line() {
        let slide = render(&SlideContent::new().with("items", "First\n\nSecond"));
        let entries = &slide.text_boxes[1].paragraphs;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, "2. Second");
    }
}
