//! Session persistence for save/load functionality.
//!
//! The save file is a small JSON document holding only the mutable
//! relationship state: who is focused, who is known, every opinion score,
//! and where the player is standing. Static content (locations, roster,
//! script) is never persisted. Every field is optional on load so an old
//! or hand-edited save degrades field by field instead of failing whole.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The on-disk session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedSession {
    /// Focused girl key, if any.
    #[serde(default)]
    pub focused: Option<String>,

    /// Acquaintance ledger.
    #[serde(default)]
    pub known_girls: Vec<String>,

    /// Girl key -> opinion score.
    #[serde(default)]
    pub opinions: BTreeMap<String, i32>,

    /// Player location key.
    #[serde(default)]
    pub location: Option<String>,
}

impl SavedSession {
    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut saved = SavedSession::default();
        saved.focused = Some("tammy".to_string());
        saved.known_girls = vec!["liz".to_string(), "tammy".to_string()];
        saved.opinions.insert("tammy".to_string(), 4);
        saved.opinions.insert("liz".to_string(), -2);
        saved.location = Some("bar".to_string());

        saved.save_json(&path).await.unwrap();
        let loaded = SavedSession::load_json(&path).await.unwrap();

        assert_eq!(loaded.focused.as_deref(), Some("tammy"));
        assert_eq!(loaded.known_girls, saved.known_girls);
        assert_eq!(loaded.opinions, saved.opinions);
        assert_eq!(loaded.location.as_deref(), Some("bar"));
    }

    #[tokio::test]
    async fn test_load_tolerates_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"opinions": {"kerry": 7}}"#).unwrap();

        let loaded = SavedSession::load_json(&path).await.unwrap();
        assert_eq!(loaded.opinions.get("kerry"), Some(&7));
        assert!(loaded.focused.is_none());
        assert!(loaded.known_girls.is_empty());
        assert!(loaded.location.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SavedSession::load_json(dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(PersistError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = SavedSession::load_json(&path).await;
        assert!(matches!(result, Err(PersistError::Json(_))));
    }
}
