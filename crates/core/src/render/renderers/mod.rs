//! # Slide Renderers
//!
//! One renderer per slide family. Each fills a blank [`DeckSlide`] from
//! the slide's content, placing a text box per placeholder it handles.
//! Renderers never fail: missing content is skipped and logged.

mod contents;
mod content;
mod cover;
mod ending;

pub use content::{body_paragraphs, ContentRenderer};
pub use contents::{ContentsRenderer, DEFAULT_CONTENTS_TITLE};
pub use cover::CoverRenderer;
pub use ending::{EndingRenderer, DEFAULT_ENDING_MESSAGE};

use crate::outline::SlideContent;
use crate::render::deck::{DeckSlide, Paragraph, TextBox};
use crate::render::style::{resolve_alignment, resolve_position};
use crate::render::RendererKind;
use crate::template::{FontConfig, Layout, Placeholder, Template};

/// Spacing after body paragraphs, in points
pub const BODY_SPACING_PT: u32 = 8;
/// Spacing after table-of-contents entries, in points
pub const CONTENTS_SPACING_PT: u32 = 12;

pub trait SlideRenderer: Send + Sync {
    fn render(&self, slide: &mut DeckSlide, layout: &Layout, content: &SlideContent, template: &Template);
}

static COVER: CoverRenderer = CoverRenderer;
static CONTENTS: ContentsRenderer = ContentsRenderer;
static CONTENT: ContentRenderer = ContentRenderer;
static ENDING: EndingRenderer = EndingRenderer;

/// The renderer for a slide family
pub fn renderer_for(kind: RendererKind) -> &'static dyn SlideRenderer {
    match kind {
        RendererKind::Cover => &COVER,
        RendererKind::Contents => &CONTENTS,
        RendererKind::Content => &CONTENT,
        RendererKind::Ending => &ENDING,
    }
}

/// Add an empty text box positioned on `placeholder`
fn place<'a>(slide: &'a mut DeckSlide, placeholder: &Placeholder) -> &'a mut TextBox {
    let canvas = slide.canvas;
    slide.add_text_box(resolve_position(placeholder, canvas.width, canvas.height))
}

/// Add a text box holding a single paragraph
fn single_line(
    slide: &mut DeckSlide,
    placeholder: &Placeholder,
    text: impl Into<String>,
    font: Option<&FontConfig>,
) {
    let alignment = resolve_alignment(&placeholder.alignment);
    place(slide, placeholder).push(
        Paragraph::new(text)
            .with_alignment(alignment)
            .with_font(font),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::deck::Alignment;
    use crate::render::style::Canvas;
    use crate::testing::business_template;

    #[test]
    fn test_renderer_for_each_family() {
        let template = business_template();
        let layout = template.layout("cover").unwrap();
        let content = SlideContent::new().with("title", "Hello");
        let mut slide = DeckSlide::new(Canvas::WIDESCREEN);
        renderer_for(RendererKind::Cover).render(&mut slide, layout, &content, &template);
        assert_eq!(slide.text_boxes.len(), 1);
        assert_eq!(slide.text_boxes[0].paragraphs[0].alignment, Alignment::Center);
    }
}
