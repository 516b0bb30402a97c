//! # Presentation Assembler
//!
//! Walks an outline slide by slide, dispatches each slide to the renderer
//! for its layout family, and writes the finished deck. The whole deck is
//! built in memory before anything touches the disk, so a failing slide
//! never leaves a partial file behind.

use crate::error::{DeckError, DeckResult};
use crate::outline::{Outline, SlideOutline};
use crate::render::deck::Deck;
use crate::render::renderers::renderer_for;
use crate::render::style::Canvas;
use crate::render::{classify, RendererKind};
use crate::template::{Template, TemplateStore, TemplateValidator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct PresentationAssembler {
    store: Arc<TemplateStore>,
    output_dir: PathBuf,
    canvas: Canvas,
}

impl PresentationAssembler {
    pub fn new(store: Arc<TemplateStore>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
            canvas: Canvas::WIDESCREEN,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Default output path for an outline
    pub fn output_path(&self, outline: &Outline) -> PathBuf {
        self.output_dir.join(format!("{}.pptx", outline.outline_id))
    }

    /// Build the deck in memory.
    ///
    /// Every slide's layout tag must name a layout key of `template`.
    pub fn build(&self, outline: &Outline, template: &Template) -> DeckResult<Deck> {
        let mut deck = Deck::new(self.canvas)
            .with_title(outline.title(), outline.author.clone())
            .with_theme(template);

        for slide in outline.slides() {
            let layout = template.layout(&slide.layout_type).ok_or_else(|| {
                DeckError::render(format!(
                    "slide {}: layout '{}' not found in template '{}'",
                    slide.slide_number, slide.layout_type, template.template_id
                ))
            })?;

            let kind = classify(&slide.layout_type).unwrap_or_else(|| {
                tracing::warn!(
                    layout = %slide.layout_type,
                    "Unknown layout type, using content renderer"
                );
                RendererKind::Content
            });
            missing_content(kind, slide, template)?;
            tracing::debug!(slide = slide.slide_number, ?kind, "Rendering slide");
            renderer_for(kind).render(deck.add_slide(), layout, &slide.content, template);
        }

        Ok(deck)
    }

    /// Render an outline to a `.pptx` file and return its path.
    ///
    /// Without an explicit template the outline's `template_id` is loaded
    /// from the store. Without an explicit path the file lands in the
    /// output directory as `{outline_id}.pptx`.
    #[tracing::instrument(skip_all, fields(outline_id = %outline.outline_id))]
    pub async fn assemble(
        &self,
        outline: &Outline,
        template: Option<Arc<Template>>,
        output: Option<&Path>,
    ) -> DeckResult<PathBuf> {
        let template = match template {
            Some(template) => template,
            None => self.store.load(&outline.template_id).await?,
        };

        let deck = self.build(outline, &template)?;
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => self.output_path(outline),
        };
        deck.save(&path).await.map_err(|e| match e {
            DeckError::Render(_) => e,
            other => DeckError::render(format!("failed to save presentation: {}", other)),
        })?;

        tracing::info!(
            path = %path.display(),
            slides = deck.slide_count(),
            template = %template.template_id,
            "Presentation rendered"
        );
        Ok(path)
    }

    /// Load an outline JSON file and render it
    pub async fn render_outline_file(
        &self,
        outline_path: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> DeckResult<PathBuf> {
        let outline = Outline::load(outline_path).await?;
        self.assemble(&outline, None, output).await
    }
}

/// Text placeholders of a content slide that the outline leaves empty.
///
/// Cover, contents and ending slides skip absent fields silently.
fn missing_content(
    kind: RendererKind,
    slide: &SlideOutline,
    template: &Template,
) -> DeckResult<Vec<String>> {
    match kind {
        RendererKind::Content => {
            TemplateValidator::validate_layout_content(&slide.layout_type, &slide.content, template)
        }
        _ => Ok(Vec::new()),
    }
}
