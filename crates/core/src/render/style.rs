//! # Style Resolution
//!
//! Pure helpers shared by every slide renderer: placeholder geometry,
//! font fallback, alignment normalization and backgrounds.

use crate::render::deck::{Alignment, DeckSlide, Emu, Rect};
use crate::template::{BackgroundKind, FontConfig, Layout, Placeholder, Template};

/// EMUs per inch
pub const EMU_PER_INCH: Emu = 914_400;

/// Slide canvas size in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: Emu,
    pub height: Emu,
}

impl Canvas {
    /// 16:9, 10in x 5.625in
    pub const WIDESCREEN: Canvas = Canvas {
        width: 9_144_000,
        height: 5_143_500,
    };
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::WIDESCREEN
    }
}

/// Scale a placeholder's fractional rectangle onto the canvas. No clamping.
pub fn resolve_position(placeholder: &Placeholder, width: Emu, height: Emu) -> Rect {
    let scale = |fraction: f64, extent: Emu| (fraction * extent as f64).round() as Emu;
    Rect {
        left: scale(placeholder.x, width),
        top: scale(placeholder.y, height),
        width: scale(placeholder.width, width),
        height: scale(placeholder.height, height),
    }
}

/// Placeholder font if declared, else the theme font for `role`
pub fn resolve_font<'a>(
    placeholder: &'a Placeholder,
    template: &'a Template,
    role: &str,
) -> Option<&'a FontConfig> {
    placeholder.font.as_ref().or_else(|| template.font(role))
}

/// Exact `left`, `center` or `right`; anything else falls back to left
pub fn resolve_alignment(value: &str) -> Alignment {
    match value {
        "left" => Alignment::Left,
        "center" => Alignment::Center,
        "right" => Alignment::Right,
        other => {
            tracing::warn!(alignment = other, "Unknown alignment, using left");
            Alignment::Left
        }
    }
}

/// Fill the slide background from the layout. Problems are logged, never raised.
pub fn apply_background(slide: &mut DeckSlide, layout: &Layout) {
    let Some(background) = &layout.background else {
        return;
    };
    match background.kind {
        BackgroundKind::Solid => match &background.color {
            Some(color) => slide.background = Some(color.clone()),
            None => tracing::warn!("Failed to set background color: solid background has no color"),
        },
        kind => tracing::debug!(?kind, "Background kind not applied"),
    }
}
