//! # Rendering
//!
//! Turns an outline and a template into a [`Deck`] and writes it as a
//! `.pptx` package.
//!
//! ## Layout
//!
//! - `style` - geometry, font and alignment resolution
//! - `renderers` - one renderer per slide family
//! - `assembler` - walks the outline and dispatches to the renderers
//! - `deck` / `pptx` - in-memory document and its OOXML serialization

pub mod assembler;
pub mod deck;
pub mod pptx;
pub mod renderers;
pub mod style;

pub use assembler::PresentationAssembler;
pub use deck::{Alignment, Deck, DeckSlide, Paragraph, Rect, TextBox};
pub use style::Canvas;

/// The renderer family a layout tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    Cover,
    Contents,
    Content,
    Ending,
}

/// Classify a layout tag. Returns `None` for tags no renderer claims.
pub fn classify(layout_type: &str) -> Option<RendererKind> {
    match layout_type {
        "cover" => Some(RendererKind::Cover),
        "toc" | "table_of_contents" => Some(RendererKind::Contents),
        "ending" => Some(RendererKind::Ending),
        tag if tag.starts_with("content_") => Some(RendererKind::Content),
        _ => None,
    }
}
