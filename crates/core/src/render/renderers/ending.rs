use super::{single_line, SlideRenderer};
use crate::outline::SlideContent;
use crate::render::deck::DeckSlide;
use crate::render::style::{apply_background, resolve_font};
use crate::template::{Layout, Template};

pub const DEFAULT_ENDING_MESSAGE: &str = "Thank you!";

/// Closing slide: the message and any further lines such as contact details
pub struct EndingRenderer;

impl SlideRenderer for EndingRenderer {
    fn render(&self, slide: &mut DeckSlide, layout: &Layout, content: &SlideContent, template: &Template) {
        apply_background(slide, layout);

        for placeholder in &layout.placeholders {
            let is_message = placeholder.id == "message";
            let text = match content.text(&placeholder.id) {
                Some(text) => text,
                None if is_message => DEFAULT_ENDING_MESSAGE.to_string(),
                None => continue,
            };
            let role = if is_message { "title" } else { "body" };
            single_line(slide, placeholder, text, resolve_font(placeholder, template, role));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::Canvas;
    use crate::testing::business_template;

    #[test]
    fn test_default_message() {
        let template = business_template();
        let mut slide = DeckSlide::new(Canvas::WIDESCREEN);
        EndingRenderer.render(&mut slide, template.layout("ending").unwrap(), &SlideContent::new(), &template);

        assert_eq!(slide.text_boxes.len(), 1);
        assert_eq!(slide.text_boxes[0].text(), DEFAULT_ENDING_MESSAGE);
        assert!(slide.background.is_some());
    }

    #[test]
    fn test_contact_line() {
        let template = business_template();
        let content = SlideContent::new()
            .with("message", "Questions?")
            .with("contact", "finance@example.com");
        let mut slide = DeckSlide::new(Canvas::WIDESCREEN);
        EndingRenderer.render(&mut slide, template.layout("ending").unwrap(), &content, &template);

        assert_eq!(slide.text_boxes.len(), 2);
        assert_eq!(slide.text_boxes[0].text(), "Questions?");
        assert_eq!(slide.text_boxes[1].text(), "finance@example.com");
    }
}
