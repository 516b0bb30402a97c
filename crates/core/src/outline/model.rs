//! # Outline Model
//!
//! The structured outline produced by the language model. An `Outline`
//! always satisfies its structural invariants: they are checked together
//! at construction and whenever an outline is deserialized.

use crate::error::{DeckError, DeckResult};
use crate::io::{read_json, write_json};
use crate::template::DEFAULT_TEMPLATE_ID;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Longest accepted presentation title, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Title used when the model omits one
pub const UNTITLED: &str = "Untitled Presentation";

// ============================================================================
// Slide content
// ============================================================================

/// A single content value keyed by placeholder id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ContentValue {
    Text(String),
    List(Vec<String>),
    Map(serde_json::Map<String, serde_json::Value>),
    Other(serde_json::Value),
}

impl ContentValue {
    /// True for blank text, empty collections and null
    pub fn is_empty(&self) -> bool {
        match self {
            ContentValue::Text(text) => text.trim().is_empty(),
            ContentValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
            ContentValue::Map(map) => map.is_empty(),
            ContentValue::Other(value) => value.is_null(),
        }
    }

    /// Plain-text rendition; list items are joined with newlines
    pub fn as_text(&self) -> String {
        match self {
            ContentValue::Text(text) => text.clone(),
            ContentValue::List(items) => items.join("\n"),
            ContentValue::Map(map) => serde_json::Value::Object(map.clone()).to_string(),
            ContentValue::Other(serde_json::Value::Null) => String::new(),
            ContentValue::Other(value) => value.to_string(),
        }
    }
}

impl From<&str> for ContentValue {
    fn from(text: &str) -> Self {
        ContentValue::Text(text.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(text: String) -> Self {
        ContentValue::Text(text)
    }
}

impl From<Vec<String>> for ContentValue {
    fn from(items: Vec<String>) -> Self {
        ContentValue::List(items)
    }
}

/// Content of one slide, keyed by placeholder id. Unknown keys are ignored
/// by the renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SlideContent(BTreeMap<String, ContentValue>);

impl SlideContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContentValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContentValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Non-empty text for `key`
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .map(ContentValue::as_text)
    }

    /// Items of a list value; a text value yields one item per line
    pub fn items(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(ContentValue::List(items)) => items.clone(),
            Some(ContentValue::Text(text)) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Some(ContentValue::Other(serde_json::Value::Array(values))) => values
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContentValue)> {
        self.0.iter()
    }
}

// ============================================================================
// Slides and metadata
// ============================================================================

/// One slide of an outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlideOutline {
    /// Slide number, starting from 1
    pub slide_number: u32,
    /// Layout key in the template, e.g. cover, toc, content_single, ending
    pub layout_type: String,
    /// Text for each placeholder, keyed by placeholder id
    #[serde(default)]
    pub content: SlideContent,
    /// Speaker notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SlideOutline {
    pub fn new(slide_number: u32, layout_type: impl Into<String>, content: SlideContent) -> Self {
        Self {
            slide_number,
            layout_type: layout_type.into(),
            content,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn is_contents(&self) -> bool {
        matches!(self.layout_type.as_str(), "toc" | "table_of_contents")
    }
}

fn default_temperature() -> f64 {
    0.7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineMetadata {
    pub total_slides: usize,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
    pub llm_model: String,
    /// The request the outline was generated from
    pub prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl OutlineMetadata {
    pub fn new(
        total_slides: usize,
        llm_model: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            total_slides,
            generated_at: Utc::now(),
            llm_model: llm_model.into(),
            prompt: prompt.into(),
            temperature,
        }
    }
}

// ============================================================================
// Outline
// ============================================================================

/// A complete presentation outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OutlineRecord")]
pub struct Outline {
    pub outline_id: String,
    title: String,
    pub author: Option<String>,
    /// Soft reference, resolved against the template store when used
    pub template_id: String,
    slides: Vec<SlideOutline>,
    pub metadata: OutlineMetadata,
}

#[derive(Deserialize)]
struct OutlineRecord {
    outline_id: String,
    title: String,
    #[serde(default)]
    author: Option<String>,
    template_id: String,
    slides: Vec<SlideOutline>,
    metadata: OutlineMetadata,
}

impl TryFrom<OutlineRecord> for Outline {
    type Error = DeckError;

    fn try_from(record: OutlineRecord) -> Result<Self, Self::Error> {
        Outline::new(
            record.outline_id,
            record.title,
            record.author,
            record.template_id,
            record.slides,
            record.metadata,
        )
    }
}

impl Outline {
    /// Build an outline, trimming the title and enforcing every invariant
    pub fn new(
        outline_id: impl Into<String>,
        title: impl Into<String>,
        author: Option<String>,
        template_id: impl Into<String>,
        slides: Vec<SlideOutline>,
        metadata: OutlineMetadata,
    ) -> DeckResult<Self> {
        let outline = Self {
            outline_id: outline_id.into(),
            title: title.into().trim().to_string(),
            author,
            template_id: template_id.into(),
            slides,
            metadata,
        };
        outline.check()?;
        Ok(outline)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slides(&self) -> &[SlideOutline] {
        &self.slides
    }

    pub fn slide(&self, slide_number: u32) -> Option<&SlideOutline> {
        self.slides.iter().find(|s| s.slide_number == slide_number)
    }

    /// Copy of this outline with one slide's content replaced
    pub fn with_slide_content(&self, slide_number: u32, content: SlideContent) -> DeckResult<Self> {
        let mut outline = self.clone();
        let slide = outline
            .slides
            .iter_mut()
            .find(|s| s.slide_number == slide_number)
            .ok_or_else(|| {
                DeckError::validation(format!("outline has no slide {}", slide_number))
            })?;
        slide.content = content;
        outline.check()?;
        Ok(outline)
    }

    /// Read a saved outline record
    pub async fn load(path: impl AsRef<Path>) -> DeckResult<Self> {
        read_json(path).await
    }

    /// Write the outline as pretty JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> DeckResult<()> {
        write_json(path, self).await
    }

    fn check(&self) -> DeckResult<()> {
        if self.title.is_empty() {
            return Err(DeckError::validation("title cannot be empty"));
        }
        let title_len = self.title.chars().count();
        if title_len > MAX_TITLE_CHARS {
            return Err(DeckError::validation(format!(
                "title is {} characters, at most {} allowed",
                title_len, MAX_TITLE_CHARS
            )));
        }

        let (first, last) = match (self.slides.first(), self.slides.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DeckError::validation("outline must have at least one slide")),
        };

        for (index, slide) in self.slides.iter().enumerate() {
            if slide.slide_number as usize != index + 1 {
                return Err(DeckError::validation(format!(
                    "slide numbers must be sequential starting from 1 (position {} has {})",
                    index + 1,
                    slide.slide_number
                )));
            }
        }

        if first.layout_type != "cover" {
            return Err(DeckError::validation("first slide must be of type 'cover'"));
        }
        if last.layout_type != "ending" {
            return Err(DeckError::validation("last slide must be of type 'ending'"));
        }
        if !self.slides.iter().any(SlideOutline::is_contents) {
            return Err(DeckError::validation(
                "outline must include a table of contents slide",
            ));
        }

        if self.metadata.total_slides < 1 {
            return Err(DeckError::validation("total_slides must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.metadata.temperature) {
            return Err(DeckError::validation(format!(
                "temperature {} is outside 0.0-2.0",
                self.metadata.temperature
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Model response shape
// ============================================================================

/// Outline as returned by the language model, before defaults and checks
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OutlineDraft {
    /// Short identifier, e.g. annual_report_2023
    #[serde(default)]
    pub outline_id: Option<String>,
    /// Presentation title (1-200 characters)
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Recommended template id
    #[serde(default)]
    pub template_id: Option<String>,
    /// Slides in order: cover first, table of contents second, ending last
    #[serde(default)]
    pub slides: Vec<SlideOutline>,
}

impl OutlineDraft {
    /// Fill defaults and build a checked outline
    pub fn into_outline(
        self,
        llm_model: &str,
        prompt: impl Into<String>,
        temperature: f64,
    ) -> DeckResult<Outline> {
        if self.slides.is_empty() {
            return Err(DeckError::validation("outline must contain slides"));
        }

        let outline_id = self
            .outline_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generated_outline_id);
        let metadata = OutlineMetadata::new(self.slides.len(), llm_model, prompt, temperature);

        Outline::new(
            outline_id,
            self.title.unwrap_or_else(|| UNTITLED.to_string()),
            self.author,
            self.template_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string()),
            self.slides,
            metadata,
        )
    }
}

/// `outline_` followed by eight hex digits
pub fn generated_outline_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("outline_{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{annual_report_outline, minimal_slides};
    use serde_json::json;

    fn metadata() -> OutlineMetadata {
        OutlineMetadata::new(3, "stub-model", "test", 0.7)
    }

    #[test]
    fn test_valid_outline() {
        let outline = annual_report_outline();
        assert_eq!(outline.slides().len(), 4);
        assert_eq!(outline.slides()[0].layout_type, "cover");
        assert_eq!(outline.title(), "Annual Report");
    }

    #[test]
    fn test_title_is_trimmed() {
        let outline =
            Outline::new("o1", "  Roadmap  ", None, "business_001", minimal_slides(), metadata())
                .unwrap();
        assert_eq!(outline.title(), "Roadmap");
    }

    #[test]
    fn test_title_bounds() {
        assert!(Outline::new("o1", "   ", None, "t", minimal_slides(), metadata()).is_err());
        let long = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(Outline::new("o1", long, None, "t", minimal_slides(), metadata()).is_err());
        let exact = "x".repeat(MAX_TITLE_CHARS);
        assert!(Outline::new("o1", exact, None, "t", minimal_slides(), metadata()).is_ok());
    }

    #[test]
    fn test_structural_invariants() {
        let slide = |n, layout: &str| SlideOutline::new(n, layout, SlideContent::new());

        // first slide must be the cover
        let slides = vec![slide(1, "toc"), slide(2, "cover"), slide(3, "ending")];
        assert!(Outline::new("o", "T", None, "t", slides, metadata()).is_err());

        // last slide must be the ending
        let slides = vec![slide(1, "cover"), slide(2, "toc"), slide(3, "content_single")];
        assert!(Outline::new("o", "T", None, "t", slides, metadata()).is_err());

        // a contents slide is required
        let slides = vec![slide(1, "cover"), slide(2, "content_single"), slide(3, "ending")];
        assert!(Outline::new("o", "T", None, "t", slides, metadata()).is_err());

        // numbering must be exactly 1..N
        let slides = vec![slide(1, "cover"), slide(3, "toc"), slide(4, "ending")];
        assert!(Outline::new("o", "T", None, "t", slides, metadata()).is_err());

        // table_of_contents spelling is accepted
        let slides = vec![
            slide(1, "cover"),
            slide(2, "table_of_contents"),
            slide(3, "ending"),
        ];
        assert!(Outline::new("o", "T", None, "t", slides, metadata()).is_ok());

        assert!(Outline::new("o", "T", None, "t", vec![], metadata()).is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut meta = metadata();
        meta.temperature = 2.5;
        assert!(Outline::new("o", "T", None, "t", minimal_slides(), meta).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let outline = annual_report_outline();
        let json = serde_json::to_string_pretty(&outline).unwrap();
        let back: Outline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outline);
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let mut value = serde_json::to_value(annual_report_outline()).unwrap();
        value["slides"][0]["layout_type"] = json!("content_single");
        let err = serde_json::from_value::<Outline>(value).unwrap_err();
        assert!(err.to_string().contains("cover"));
    }

    #[test]
    fn test_metadata_defaults() {
        let meta: OutlineMetadata = serde_json::from_value(json!({
            "total_slides": 3, "llm_model": "m", "prompt": "p"
        }))
        .unwrap();
        assert_eq!(meta.temperature, 0.7);
        assert!(meta.generated_at <= Utc::now());
    }

    #[test]
    fn test_content_values() {
        let content: SlideContent = serde_json::from_value(json!({
            "title": "Q4",
            "items": ["Revenue", "Costs"],
            "stats": {"growth": 12},
            "count": 3,
            "empty": "   "
        }))
        .unwrap();

        assert_eq!(content.text("title").as_deref(), Some("Q4"));
        assert_eq!(content.items("items"), vec!["Revenue", "Costs"]);
        assert!(matches!(content.get("stats"), Some(ContentValue::Map(_))));
        assert_eq!(content.text("count").as_deref(), Some("3"));
        assert_eq!(content.text("empty"), None);
        assert_eq!(content.text("missing"), None);
    }

    #[test]
    fn test_draft_defaults() {
        let draft: OutlineDraft = serde_json::from_value(json!({
            "slides": [
                {"slide_number": 1, "layout_type": "cover", "content": {"title": "X"}},
                {"slide_number": 2, "layout_type": "toc", "content": {}},
                {"slide_number": 3, "layout_type": "ending", "content": {}}
            ]
        }))
        .unwrap();

        let outline = draft.into_outline("stub-model", "topic", 0.5).unwrap();
        assert_eq!(outline.title(), UNTITLED);
        assert_eq!(outline.template_id, DEFAULT_TEMPLATE_ID);
        assert!(outline.outline_id.starts_with("outline_"));
        assert_eq!(outline.outline_id.len(), "outline_".len() + 8);
        assert_eq!(outline.metadata.total_slides, 3);
        assert_eq!(outline.metadata.llm_model, "stub-model");
    }

    #[test]
    fn test_draft_without_slides_rejected() {
        let draft = OutlineDraft {
            title: Some("Empty".into()),
            ..OutlineDraft::default()
        };
        assert!(draft.into_outline("m", "p", 0.7).is_err());
    }

    #[test]
    fn test_with_slide_content() {
        let outline = annual_report_outline();
        let content = SlideContent::new()
            .with("title", "Highlights")
            .with("content", "Deeper detail");
        let updated = outline.with_slide_content(3, content.clone()).unwrap();
        assert_eq!(updated.slide(3).unwrap().content, content);
        assert_ne!(outline.slide(3).unwrap().content, content);
        assert!(outline.with_slide_content(99, SlideContent::new()).is_err());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.json");
        let outline = annual_report_outline();
        outline.save(&path).await.unwrap();
        let back = Outline::load(&path).await.unwrap();
        assert_eq!(back, outline);
    }
}
