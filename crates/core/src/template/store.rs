//! # Template Store
//!
//! Loads template records from `{root}/{template_id}.json` and memoizes
//! them for the lifetime of the store. Consumers share the store through an
//! `Arc<TemplateStore>` and receive read-only `Arc<Template>` handles.

use crate::error::{DeckError, DeckResult};
use crate::io::{ensure_dir, file_exists, read_json_value};
use crate::template::model::{is_valid_template_id, Template};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use walkdir::WalkDir;

/// Listing entry for a template record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub template_id: String,
    pub template_name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
}

impl TemplateSummary {
    /// Pull summary fields out of a raw record without validating the rest
    fn from_record(record: &serde_json::Value) -> Self {
        let field = |name: &str, default: &str| {
            record
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            template_id: field("template_id", ""),
            template_name: field("template_name", ""),
            version: field("version", "1.0"),
            description: field("description", ""),
        }
    }
}

/// File-backed template store with a per-id cache
#[derive(Debug)]
pub struct TemplateStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl TemplateStore {
    /// Open a store rooted at `root`, creating the directory if it is absent
    pub async fn new(root: impl Into<PathBuf>) -> DeckResult<Self> {
        let root = root.into();
        if !file_exists(&root).await {
            tracing::warn!(dir = %root.display(), "Template directory does not exist, creating it");
            ensure_dir(&root).await?;
        }
        Ok(Self {
            root,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, template_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", template_id))
    }

    /// Load a template by id, serving repeated requests from the cache
    pub async fn load(&self, template_id: &str) -> DeckResult<Arc<Template>> {
        if let Some(template) = self.cached(template_id) {
            return Ok(template);
        }

        let path = self.record_path(template_id);
        if !is_valid_template_id(template_id) || !file_exists(&path).await {
            return Err(DeckError::template_not_found(
                template_id,
                path.display().to_string(),
            ));
        }

        tracing::info!(template_id, "Loading template");
        let record = read_json_value(&path).await.map_err(|e| {
            tracing::error!(template_id, error = %e, "Failed to read template");
            DeckError::invalid_template(format!("{}: {}", path.display(), e))
        })?;
        let template: Template = serde_json::from_value(record).map_err(|e| {
            tracing::error!(template_id, error = %e, "Failed to load template");
            DeckError::invalid_template(format!("invalid template format: {}", e))
        })?;
        tracing::debug!(name = %template.template_name, "Template loaded");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache
            .entry(template_id.to_string())
            .or_insert_with(|| Arc::new(template));
        Ok(Arc::clone(entry))
    }

    /// Summaries of every readable `*.json` record, sorted by file name
    pub async fn list(&self) -> DeckResult<Vec<TemplateSummary>> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        let mut summaries = Vec::with_capacity(paths.len());
        for path in paths {
            match read_json_value(&path).await {
                Ok(record) => summaries.push(TemplateSummary::from_record(&record)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read template");
                }
            }
        }

        tracing::info!(count = summaries.len(), "Found templates");
        Ok(summaries)
    }

    /// Summary of one template without full validation
    pub async fn info(&self, template_id: &str) -> DeckResult<TemplateSummary> {
        let path = self.record_path(template_id);
        if !is_valid_template_id(template_id) || !file_exists(&path).await {
            return Err(DeckError::template_not_found(
                template_id,
                path.display().to_string(),
            ));
        }
        let record = read_json_value(&path).await?;
        Ok(TemplateSummary::from_record(&record))
    }

    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("Template cache cleared");
    }

    pub fn is_cached(&self, template_id: &str) -> bool {
        self.cached(template_id).is_some()
    }

    fn cached(&self, template_id: &str) -> Option<Arc<Template>> {
        // entries are whole `Arc`s, so a poisoned map is still consistent
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(template_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bundled_store, BUSINESS_TEMPLATE_JSON};

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        let store = TemplateStore::new(&root).await.unwrap();
        assert!(root.is_dir());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_is_memoized() {
        let (_dir, store) = bundled_store().await;
        assert!(!store.is_cached("business_001"));

        let first = store.load("business_001").await.unwrap();
        assert!(store.is_cached("business_001"));
        let second = store.load("business_001").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        store.clear_cache();
        assert!(!store.is_cached("business_001"));
    }

    #[tokio::test]
    async fn test_cache_recovers_from_poisoned_lock() {
        let (_dir, store) = bundled_store().await;
        store.load("business_001").await.unwrap();

        let joined = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = store.cache.write().unwrap();
                    panic!("writer panicked while holding the cache");
                })
                .join()
        });
        assert!(joined.is_err());
        assert!(store.cache.is_poisoned());

        assert!(store.is_cached("business_001"));
        store.clear_cache();
        assert!(!store.is_cached("business_001"));
        assert!(store.load("business_001").await.is_ok());
    }

    #[tokio::test]
    async fn test_load_missing_template() {
        let (_dir, store) = bundled_store().await;
        let err = store.load("nonexistent").await.unwrap_err();
        assert!(matches!(err, DeckError::TemplateNotFound { .. }));

        let err = store.load("../business_001").await.unwrap_err();
        assert!(matches!(err, DeckError::TemplateNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_template() {
        let (dir, store) = bundled_store().await;
        let mut value: serde_json::Value = serde_json::from_str(BUSINESS_TEMPLATE_JSON).unwrap();
        value["template_id"] = serde_json::json!("broken_001");
        value["layouts"].as_object_mut().unwrap().remove("cover");
        std::fs::write(
            dir.path().join("broken_001.json"),
            serde_json::to_string(&value).unwrap(),
        )
        .unwrap();

        let err = store.load("broken_001").await.unwrap_err();
        assert!(matches!(err, DeckError::InvalidTemplate(_)));
        assert!(!store.is_cached("broken_001"));
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_records() {
        let (dir, store) = bundled_store().await;
        std::fs::write(dir.path().join("garbage.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let summaries = store.list().await.unwrap();
        let ids: Vec<&str> = summaries.iter().map(|s| s.template_id.as_str()).collect();
        assert_eq!(ids, vec!["business_001", "simple_001"]);
        assert_eq!(summaries[0].template_name, "Business");
    }

    #[tokio::test]
    async fn test_info() {
        let (_dir, store) = bundled_store().await;
        let info = store.info("simple_001").await.unwrap();
        assert_eq!(info.template_name, "Simple");
        assert_eq!(info.version, "1.0");
        assert!(!store.is_cached("simple_001"));

        assert!(matches!(
            store.info("missing").await.unwrap_err(),
            DeckError::TemplateNotFound { .. }
        ));
    }
}
