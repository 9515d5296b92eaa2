//! Character and knowledge sheets.
//!
//! Optional YAML files feed the stats and knowledge panes. They are pure
//! display data: nothing in choice resolution reads them. Loading is
//! tolerant all the way down; a missing or unreadable file yields the
//! defaults and a warning, never an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The player's displayed stat sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSheet {
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub mp: i32,
    pub stamina: i32,
    pub attrs: BTreeMap<String, i32>,
    pub skills: BTreeMap<String, i32>,
    pub conditions: Vec<String>,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self {
            name: "Protagonist".to_string(),
            level: 1,
            hp: 1,
            mp: 0,
            stamina: 0,
            attrs: BTreeMap::new(),
            skills: BTreeMap::new(),
            conditions: Vec::new(),
        }
    }
}

impl CharacterSheet {
    /// Load `character.yaml` from the given directory, falling back to the
    /// defaults when absent or unreadable.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        load_or_default(dir.as_ref().join("character.yaml"))
    }
}

/// The knowledge pane: free-text entries per tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Knowledge {
    pub notes: Vec<String>,
    pub factions: Vec<String>,
    pub sites: Vec<String>,
    pub tech: Vec<String>,
}

impl Knowledge {
    /// Load `knowledge.yaml` from the given directory, falling back to the
    /// defaults when absent or unreadable.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        load_or_default(dir.as_ref().join("knowledge.yaml"))
    }
}

fn load_or_default<T: Default + for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> T {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(sheet) => sheet,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "malformed sheet, using defaults");
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = CharacterSheet::load(dir.path());
        assert_eq!(sheet.name, "Protagonist");
        assert_eq!(sheet.level, 1);
        assert_eq!(sheet.hp, 1);
        assert!(sheet.attrs.is_empty());
    }

    #[test]
    fn test_partial_sheet_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("character.yaml"),
            "name: Ash\nhp: 12\nattrs:\n  grit: 3\n",
        )
        .unwrap();

        let sheet = CharacterSheet::load(dir.path());
        assert_eq!(sheet.name, "Ash");
        assert_eq!(sheet.hp, 12);
        assert_eq!(sheet.level, 1);
        assert_eq!(sheet.attrs.get("grit"), Some(&3));
    }

    #[test]
    fn test_malformed_sheet_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("character.yaml"), "name: [").unwrap();

        let sheet = CharacterSheet::load(dir.path());
        assert_eq!(sheet.name, "Protagonist");
    }

    #[test]
    fn test_knowledge_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("knowledge.yaml"),
            "notes:\n  - remember the river\nsites:\n  - old fountain\n",
        )
        .unwrap();

        let knowledge = Knowledge::load(dir.path());
        assert_eq!(knowledge.notes, vec!["remember the river"]);
        assert_eq!(knowledge.sites, vec!["old fountain"]);
        assert!(knowledge.factions.is_empty());
    }
}
