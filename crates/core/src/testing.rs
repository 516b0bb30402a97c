//! Shared fixtures for unit tests

use crate::error::{DeckError, DeckResult};
use crate::llm::{CompletionRequest, LlmClient};
use crate::outline::{Outline, OutlineDraft, SlideContent, SlideOutline};
use crate::template::{Template, TemplateStore};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const BUSINESS_TEMPLATE_JSON: &str = include_str!("../../../templates/business_001.json");
pub const SIMPLE_TEMPLATE_JSON: &str = include_str!("../../../templates/simple_001.json");

pub fn business_template() -> Template {
    serde_json::from_str(BUSINESS_TEMPLATE_JSON).unwrap()
}

/// A store over a temp dir holding both bundled templates
pub async fn bundled_store() -> (TempDir, Arc<TemplateStore>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("business_001.json"), BUSINESS_TEMPLATE_JSON).unwrap();
    std::fs::write(dir.path().join("simple_001.json"), SIMPLE_TEMPLATE_JSON).unwrap();
    let store = TemplateStore::new(dir.path()).await.unwrap();
    (dir, Arc::new(store))
}

/// LLM reply for the "Annual Report" request
pub fn annual_report_json() -> Value {
    json!({
        "outline_id": "annual_report",
        "title": "Annual Report",
        "author": "Finance Team",
        "template_id": "business_001",
        "slides": [
            {
                "slide_number": 1,
                "layout_type": "cover",
                "content": {
                    "title": "Annual Report",
                    "subtitle": "Fiscal Year 2025",
                    "author": "Finance Team",
                    "date": "2026-01-15"
                }
            },
            {
                "slide_number": 2,
                "layout_type": "toc",
                "content": {
                    "title": "Contents",
                    "items": ["Highlights", "Outlook"]
                }
            },
            {
                "slide_number": 3,
                "layout_type": "content_single",
                "content": {
                    "title": "Highlights",
                    "content": "Intro\n• Point A\n• Point B"
                },
                "notes": "Keep this under two minutes"
            },
            {
                "slide_number": 4,
                "layout_type": "ending",
                "content": {
                    "message": "Thank you!",
                    "contact": "finance@example.com"
                }
            }
        ]
    })
}

pub fn annual_report_outline() -> Outline {
    let draft: OutlineDraft = serde_json::from_value(annual_report_json()).unwrap();
    draft.into_outline("stub-model", "Annual Report", 0.7).unwrap()
}

/// Cover, contents and ending slides numbered 1..=3
pub fn minimal_slides() -> Vec<SlideOutline> {
    vec![
        SlideOutline::new(1, "cover", SlideContent::new().with("title", "Minimal")),
        SlideOutline::new(
            2,
            "toc",
            SlideContent::new().with("items", vec!["Only".to_string()]),
        ),
        SlideOutline::new(3, "ending", SlideContent::new()),
    ]
}

/// Scripted [`LlmClient`] that records its calls
pub struct StubLlm {
    replies: Vec<Result<Value, String>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl StubLlm {
    /// Replies in order; the last reply repeats once the list runs out
    pub fn with_replies(replies: Vec<Result<Value, String>>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn always(value: Value) -> Self {
        Self::with_replies(vec![Ok(value)])
    }

    pub fn failing(message: &str) -> Self {
        Self::with_replies(vec![Err(message.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn generate_text(&self, request: &CompletionRequest) -> DeckResult<String> {
        self.generate_structured(request).await.map(|v| v.to_string())
    }

    async fn generate_structured(&self, request: &CompletionRequest) -> DeckResult<Value> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let reply = self
            .replies
            .get(index)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_else(|| Err("no scripted reply".to_string()));
        reply.map_err(DeckError::llm)
    }
}
