//! # Deck Agent
//!
//! Drives a request from topic to finished document: outline generation,
//! template validation, rendering and outline persistence. Each public
//! entry point reports failures as a single [`DeckError::Agent`] naming
//! the stage that failed. Files written before the failure are kept.

use crate::config::Settings;
use crate::error::{DeckError, DeckResult};
use crate::llm::LlmClient;
use crate::outline::{Outline, OutlineGenerator, OutlineRequest};
use crate::render::PresentationAssembler;
use crate::template::{Template, TemplateStore, TemplateSummary, TemplateValidator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::stage::{Pipeline, PipelineStage};

/// A request to generate a presentation from a topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    /// Template to use; the model recommends one when absent
    pub template_id: Option<String>,
    pub author: Option<String>,
    pub max_slides: Option<usize>,
    /// Overrides the configured output directory
    pub output_dir: Option<PathBuf>,
    /// Write `{outline_id}.json` next to the document
    pub save_outline: bool,
    pub temperature: Option<f64>,
}

impl GenerateRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            template_id: None,
            author: None,
            max_slides: None,
            output_dir: None,
            save_outline: true,
            temperature: None,
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = Some(max_slides);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn without_outline(mut self) -> Self {
        self.save_outline = false;
        self
    }
}

/// Files produced by a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedFiles {
    pub deck_path: PathBuf,
    pub outline_path: Option<PathBuf>,
}

pub struct DeckAgent {
    settings: Settings,
    store: Arc<TemplateStore>,
    generator: OutlineGenerator,
    assembler: PresentationAssembler,
}

impl DeckAgent {
    /// Build an agent from settings, creating the provider client from the environment
    pub async fn new(settings: Settings) -> DeckResult<Self> {
        let llm = settings.model.create_llm()?;
        let store = Arc::new(TemplateStore::new(&settings.template_dir).await?);
        Ok(Self::from_parts(llm, store, settings))
    }

    pub fn from_parts(llm: Arc<dyn LlmClient>, store: Arc<TemplateStore>, settings: Settings) -> Self {
        let generator = OutlineGenerator::new(llm, store.clone()).with_settings(&settings);
        let assembler = PresentationAssembler::new(store.clone(), &settings.output_dir);
        tracing::info!(
            model = %generator.model(),
            templates = %store.root().display(),
            "Deck agent ready"
        );
        Self {
            settings,
            store,
            generator,
            assembler,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    /// Topic to document: outline, template, rendering, optional outline file
    #[tracing::instrument(skip_all, fields(topic = %request.topic))]
    pub async fn generate_presentation(&self, request: GenerateRequest) -> DeckResult<GeneratedFiles> {
        let mut pipeline = Pipeline::for_generation();
        match self.run_generation(&request, &mut pipeline).await {
            Ok(files) => {
                tracing::info!(deck = %files.deck_path.display(), "Presentation generated");
                Ok(files)
            }
            Err(e) => Err(Self::failed(&mut pipeline, e)),
        }
    }

    async fn run_generation(
        &self,
        request: &GenerateRequest,
        pipeline: &mut Pipeline,
    ) -> DeckResult<GeneratedFiles> {
        let mut outline_request = OutlineRequest::new(&request.topic).with_retries(self.settings.retries);
        outline_request.template_id = request.template_id.clone();
        outline_request.author = request.author.clone();
        outline_request.max_slides = request.max_slides;
        outline_request.temperature = request.temperature;

        let outline = self.generator.generate(&outline_request).await?;
        pipeline.advance();

        let template = self.checked_template(&outline.template_id).await?;
        pipeline.advance();

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| self.settings.output_dir.clone());
        let deck_path = output_dir.join(format!("{}.pptx", outline.outline_id));
        self.assembler
            .assemble(&outline, Some(template), Some(&deck_path))
            .await?;

        if !request.save_outline {
            pipeline.finish();
            return Ok(GeneratedFiles {
                deck_path,
                outline_path: None,
            });
        }
        pipeline.advance();

        let outline_path = output_dir.join(format!("{}.json", outline.outline_id));
        outline.save(&outline_path).await?;
        pipeline.advance();

        Ok(GeneratedFiles {
            deck_path,
            outline_path: Some(outline_path),
        })
    }

    /// Rework a saved outline from feedback and render it again.
    ///
    /// Writes `{outline_id}_refined.pptx` and `{outline_id}_refined.json` to
    /// `output_dir`, or next to the source outline.
    #[tracing::instrument(skip_all, fields(outline = %outline_path.as_ref().display()))]
    pub async fn refine_presentation(
        &self,
        outline_path: impl AsRef<Path>,
        feedback: &str,
        output_dir: Option<&Path>,
    ) -> DeckResult<GeneratedFiles> {
        let mut pipeline = Pipeline::for_refinement();
        match self
            .run_refinement(outline_path.as_ref(), feedback, output_dir, &mut pipeline)
            .await
        {
            Ok(files) => {
                tracing::info!(deck = %files.deck_path.display(), "Presentation refined");
                Ok(files)
            }
            Err(e) => Err(Self::failed(&mut pipeline, e)),
        }
    }

    async fn run_refinement(
        &self,
        outline_path: &Path,
        feedback: &str,
        output_dir: Option<&Path>,
        pipeline: &mut Pipeline,
    ) -> DeckResult<GeneratedFiles> {
        let current = Outline::load(outline_path).await?;
        pipeline.advance();

        let refined = self.generator.refine(&current, feedback, None).await?;
        pipeline.advance();

        let template = self.checked_template(&refined.template_id).await?;
        pipeline.advance();

        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => parent_dir(outline_path),
        };
        let deck_path = dir.join(format!("{}_refined.pptx", refined.outline_id));
        self.assembler
            .assemble(&refined, Some(template), Some(&deck_path))
            .await?;
        pipeline.advance();

        let refined_path = dir.join(format!("{}_refined.json", refined.outline_id));
        refined.save(&refined_path).await?;
        pipeline.advance();

        Ok(GeneratedFiles {
            deck_path,
            outline_path: Some(refined_path),
        })
    }

    /// Expand one slide of a saved outline and write the updated outline.
    ///
    /// Defaults to `{outline_id}_expanded.json` next to the source outline.
    pub async fn expand_slide(
        &self,
        outline_path: impl AsRef<Path>,
        slide_number: u32,
        output: Option<&Path>,
    ) -> DeckResult<PathBuf> {
        let outline_path = outline_path.as_ref();
        let outline = Outline::load(outline_path)
            .await
            .map_err(|e| DeckError::agent(PipelineStage::OutlineLoading, &e))?;
        let expanded = self
            .generator
            .expand_slide(&outline, slide_number, None)
            .await
            .map_err(|e| DeckError::agent(PipelineStage::OutlineRefinement, &e))?;

        let target = match output {
            Some(path) => path.to_path_buf(),
            None => parent_dir(outline_path).join(format!("{}_expanded.json", expanded.outline_id)),
        };
        expanded
            .save(&target)
            .await
            .map_err(|e| DeckError::agent(PipelineStage::OutlineSaving, &e))?;
        tracing::info!(path = %target.display(), slide_number, "Slide expanded");
        Ok(target)
    }

    pub async fn list_templates(&self) -> DeckResult<Vec<TemplateSummary>> {
        self.store.list().await
    }

    pub async fn template_info(&self, template_id: &str) -> DeckResult<TemplateSummary> {
        self.store.info(template_id).await
    }

    async fn checked_template(&self, template_id: &str) -> DeckResult<Arc<Template>> {
        let template = self.store.load(template_id).await?;
        TemplateValidator::validate(&template)?;
        Ok(template)
    }

    fn failed(pipeline: &mut Pipeline, cause: DeckError) -> DeckError {
        let stage = pipeline.fail();
        tracing::error!(%stage, error = %cause, "Pipeline failed");
        DeckError::agent(stage, &cause)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{annual_report_json, annual_report_outline, bundled_store, StubLlm};
    use serde_json::json;
    use std::io::Read;

    async fn agent(llm: Arc<StubLlm>) -> (tempfile::TempDir, DeckAgent) {
        let (dir, store) = bundled_store().await;
        let settings = Settings {
            template_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("output"),
            ..Settings::default()
        };
        (dir, DeckAgent::from_parts(llm, store, settings))
    }

    fn slide_xml(deck: &Path, number: usize) -> Option<String> {
        let file = std::fs::File::open(deck).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(&format!("ppt/slides/slide{}.xml", number)).ok()?;
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        Some(xml)
    }

    #[tokio::test]
    async fn test_generate_annual_report() {
        let llm = Arc::new(StubLlm::always(annual_report_json()));
        let (dir, agent) = agent(llm.clone()).await;

        let files = agent
            .generate_presentation(GenerateRequest::new("Annual Report"))
            .await
            .unwrap();

        let output = dir.path().join("output");
        assert_eq!(files.deck_path, output.join("annual_report.pptx"));
        assert_eq!(files.outline_path, Some(output.join("annual_report.json")));
        assert_eq!(llm.calls(), 1);

        let saved = Outline::load(files.outline_path.unwrap()).await.unwrap();
        assert_eq!(saved.outline_id, "annual_report");
        assert_eq!(saved.template_id, "business_001");
        assert_eq!(saved.slides().len(), 4);

        for number in 1..=4 {
            assert!(slide_xml(&files.deck_path, number).is_some());
        }
        assert!(slide_xml(&files.deck_path, 5).is_none());
        let contents = slide_xml(&files.deck_path, 2).unwrap();
        assert!(contents.contains("<a:t>Contents</a:t>"));
        assert!(contents.contains("<a:t>1. Highlights</a:t>"));
        let body = slide_xml(&files.deck_path, 3).unwrap();
        assert!(body.contains("<a:t>Point B</a:t>"));
    }

    #[tokio::test]
    async fn test_generate_without_outline_file() {
        let llm = Arc::new(StubLlm::always(annual_report_json()));
        let (dir, agent) = agent(llm).await;
        let target = dir.path().join("elsewhere");

        let files = agent
            .generate_presentation(
                GenerateRequest::new("Annual Report")
                    .with_output_dir(&target)
                    .without_outline(),
            )
            .await
            .unwrap();
        assert!(files.outline_path.is_none());
        assert!(target.join("annual_report.pptx").is_file());
        assert!(!target.join("annual_report.json").exists());
    }

    #[tokio::test]
    async fn test_generation_failure_names_stage() {
        let llm = Arc::new(StubLlm::failing("connection reset"));
        let (dir, agent) = agent(llm.clone()).await;

        let err = agent
            .generate_presentation(GenerateRequest::new("Annual Report"))
            .await
            .unwrap_err();
        assert_eq!(llm.calls(), 3);
        match err {
            DeckError::Agent { stage, message } => {
                assert_eq!(stage, PipelineStage::OutlineGeneration);
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected agent error, got {:?}", other),
        }
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn test_refine_keeps_id() {
        let mut reply = annual_report_json();
        reply["outline_id"] = json!("fresh_id");
        reply["title"] = json!("Annual Report with Risks");
        let llm = Arc::new(StubLlm::always(reply));
        let (dir, agent) = agent(llm).await;

        let mut current = annual_report_outline();
        current.outline_id = "X".into();
        let source = dir.path().join("decks/X.json");
        current.save(&source).await.unwrap();

        let files = agent
            .refine_presentation(&source, "Add a risks section", None)
            .await
            .unwrap();
        assert_eq!(files.deck_path, dir.path().join("decks/X_refined.pptx"));
        assert!(files.deck_path.is_file());

        let refined = Outline::load(files.outline_path.unwrap()).await.unwrap();
        assert_eq!(refined.outline_id, "X");
        assert_eq!(refined.title(), "Annual Report with Risks");
    }

    #[tokio::test]
    async fn test_refine_missing_outline() {
        let llm = Arc::new(StubLlm::always(annual_report_json()));
        let (dir, agent) = agent(llm.clone()).await;

        let err = agent
            .refine_presentation(dir.path().join("nope.json"), "shorter", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeckError::Agent {
                stage: PipelineStage::OutlineLoading,
                ..
            }
        ));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_expand_then_render_expanded_outline() {
        let llm = Arc::new(StubLlm::always(json!({
            "title": "Highlights",
            "content": "Intro\n• Revenue up\n• Margins steady"
        })));
        let (dir, agent) = agent(llm).await;
        let source = dir.path().join("annual_report.json");
        annual_report_outline().save(&source).await.unwrap();

        let expanded = agent.expand_slide(&source, 3, None).await.unwrap();
        assert_eq!(expanded, dir.path().join("annual_report_expanded.json"));

        let deck = agent.assembler.render_outline_file(&expanded, None).await.unwrap();
        assert_eq!(deck, dir.path().join("output/annual_report.pptx"));
        assert!(slide_xml(&deck, 3).unwrap().contains("Margins steady"));
    }

    #[tokio::test]
    async fn test_template_listing() {
        let llm = Arc::new(StubLlm::always(annual_report_json()));
        let (_dir, agent) = agent(llm).await;

        let templates = agent.list_templates().await.unwrap();
        let ids: Vec<&str> = templates.iter().map(|t| t.template_id.as_str()).collect();
        assert_eq!(ids, vec!["business_001", "simple_001"]);

        let info = agent.template_info("simple_001").await.unwrap();
        assert_eq!(info.template_name, "Simple");
        assert!(agent.template_info("nope_001").await.is_err());
    }
}
