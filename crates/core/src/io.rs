//! # IO Utilities
//!
//! JSON record helpers shared by the template store, the outline
//! persistence code and the agent.

use crate::error::{DeckError, DeckResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;

/// Ensure a directory exists
pub async fn ensure_dir(path: impl AsRef<Path>) -> DeckResult<()> {
    fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}

/// Read a JSON record into `T`
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> DeckResult<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a JSON record as an untyped value
pub async fn read_json_value(path: impl AsRef<Path>) -> DeckResult<serde_json::Value> {
    read_json(path).await
}

/// Write `value` as pretty JSON, creating parent directories
pub async fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> DeckResult<()> {
    let path = path.as_ref();

    // Ensure parent dir exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await.map_err(|e| {
        DeckError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to write {}: {}", path.display(), e),
        ))
    })
}

/// Check if a file exists
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref()).await.is_ok()
}
