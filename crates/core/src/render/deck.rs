//! # Deck Model
//!
//! In-memory presentation built by the renderers and serialized by
//! [`crate::render::pptx`]. Positions and sizes are in EMU.

use crate::error::{DeckError, DeckResult};
use crate::render::pptx;
use crate::render::style::Canvas;
use crate::template::{ColorScheme, FontConfig, HexColor, Template};
use std::path::Path;

/// English Metric Units (914400 per inch)
pub type Emu = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A paragraph of text inside a text box
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// May contain line breaks
    pub text: String,
    /// Outline level, 0 for top level
    pub level: u8,
    pub bullet: bool,
    pub alignment: Alignment,
    /// Spacing after the paragraph, in points
    pub space_after: Option<u32>,
    pub font: Option<FontConfig>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: 0,
            bullet: false,
            alignment: Alignment::Left,
            space_after: None,
            font: None,
        }
    }

    /// Spacing-only paragraph
    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn bulleted(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_space_after(mut self, points: u32) -> Self {
        self.space_after = Some(points);
        self
    }

    pub fn with_font(mut self, font: Option<&FontConfig>) -> Self {
        self.font = font.cloned();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub rect: Rect,
    pub word_wrap: bool,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBox {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            word_wrap: true,
            paragraphs: Vec::new(),
        }
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Paragraph texts joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckSlide {
    pub canvas: Canvas,
    /// Solid background fill
    pub background: Option<HexColor>,
    pub text_boxes: Vec<TextBox>,
}

impl DeckSlide {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            background: None,
            text_boxes: Vec::new(),
        }
    }

    /// Append a text box and return it for filling
    pub fn add_text_box(&mut self, rect: Rect) -> &mut TextBox {
        self.text_boxes.push(TextBox::new(rect));
        let last = self.text_boxes.len() - 1;
        &mut self.text_boxes[last]
    }
}

/// A presentation document
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub canvas: Canvas,
    pub title: String,
    pub author: Option<String>,
    /// Theme palette; the package falls back to a neutral palette without one
    pub palette: Option<ColorScheme>,
    /// Heading typeface
    pub major_font: String,
    /// Body typeface
    pub minor_font: String,
    slides: Vec<DeckSlide>,
}

impl Deck {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            title: String::new(),
            author: None,
            palette: None,
            major_font: "Calibri".to_string(),
            minor_font: "Calibri".to_string(),
            slides: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>, author: Option<String>) -> Self {
        self.title = title.into();
        self.author = author;
        self
    }

    /// Take palette and typefaces from a template theme
    pub fn with_theme(mut self, template: &Template) -> Self {
        self.palette = Some(template.theme.colors.clone());
        if let Some(font) = template.font("title").or_else(|| template.font("heading")) {
            self.major_font = font.name.clone();
        }
        if let Some(font) = template.font("body") {
            self.minor_font = font.name.clone();
        }
        self
    }

    /// Append a blank slide sized to the deck canvas
    pub fn add_slide(&mut self) -> &mut DeckSlide {
        self.slides.push(DeckSlide::new(self.canvas));
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slides(&self) -> &[DeckSlide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Serialize to `.pptx` bytes
    pub fn to_bytes(&self) -> DeckResult<Vec<u8>> {
        pptx::write_package(self)
    }

    /// Write the `.pptx` package, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> DeckResult<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, bytes).await.map_err(|e| {
            DeckError::render(format!("failed to write {}: {}", path.display(), e))
        })?;
        tracing::info!(path = %path.display(), slides = self.slides.len(), "Saved presentation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::business_template;

    #[test]
    fn test_add_slides_and_boxes() {
        let mut deck = Deck::new(Canvas::WIDESCREEN);
        let slide = deck.add_slide();
        let text_box = slide.add_text_box(Rect {
            left: 0,
            top: 0,
            width: 100,
            height: 100,
        });
        text_box.push(Paragraph::new("one"));
        text_box.push(Paragraph::new("two").bulleted());

        assert_eq!(deck.slide_count(), 1);
        let text_box = &deck.slides()[0].text_boxes[0];
        assert_eq!(text_box.text(), "one\ntwo");
        assert!(text_box.word_wrap);
        assert!(text_box.paragraphs[1].bullet);
    }

    #[test]
    fn test_theme_fonts() {
        let deck = Deck::new(Canvas::WIDESCREEN).with_theme(&business_template());
        assert_eq!(deck.major_font, "Calibri");
        assert!(deck.palette.is_some());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/deck.pptx");
        let mut deck = Deck::new(Canvas::WIDESCREEN).with_title("Test", None);
        deck.add_slide();
        deck.save(&path).await.unwrap();
        assert!(path.is_file());
    }
}
