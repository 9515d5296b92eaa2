//! Narrative script loading and validation.
//!
//! The script carries every display string in the game: UI chrome, dialogue
//! template strings, and the leveled dialogue trees. A default script is
//! embedded in the binary; a `script.yaml` / `script.yml` / `script.json`
//! file found in the script directory is deep-merged over it key by key, so
//! a partial script never silently drops required strings.
//!
//! Trees are normalized at load time: level keys are coerced to integers
//! and sorted ascending, and every level must carry the full statement and
//! reply sets. A script that fails validation is a configuration error the
//! engine refuses to start with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Name of the dialogue tree every girl falls back to.
pub const DEFAULT_TREE: &str = "default";

/// File names probed inside the script directory, in order.
const SCRIPT_FILES: [&str; 3] = ["script.yaml", "script.yml", "script.json"];

/// Errors from loading or validating a narrative script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no '{DEFAULT_TREE}' dialogue tree defined")]
    MissingDefaultTree,

    #[error("dialogue tree '{tree}' has no levels")]
    EmptyTree { tree: String },

    #[error("dialogue tree '{tree}' has non-numeric level key '{key}'")]
    BadLevelKey { tree: String, key: String },

    #[error("dialogue tree '{tree}' defines level {level} more than once")]
    DuplicateLevel { tree: String, level: u32 },

    #[error("the script defines no date destinations")]
    NoDateChoices,
}

// ============================================================================
// UI strings
// ============================================================================

/// Display strings for UI chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiStrings {
    pub general: GeneralUi,
    pub dialogue: DialogueUi,
    pub nav_overlay: NavUi,
    pub main_window: WindowUi,
    pub knowledge_pane: KnowledgeUi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralUi {
    pub continue_label: String,
    pub ellipsis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueUi {
    pub empty_scene: EmptyScene,
}

/// Shown when no character is focused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptyScene {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavUi {
    pub location_placeholder: String,
    pub talk_label: String,
    pub talk_button: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowUi {
    pub title: String,
    pub knowledge_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeUi {
    pub notes_tab: String,
    pub factions_tab: String,
    pub sites_tab: String,
    pub tech_tab: String,
}

// ============================================================================
// Dialogue templates
// ============================================================================

/// Template strings used when building dialogue payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueText {
    pub greeting: String,
    pub choice_prompt: String,
    pub level_label: String,
    pub opinion_label: String,
    pub date_offer: String,
    pub date_invite: String,
    pub date_confirmation: String,
    pub date_choices: Vec<DateChoice>,
    pub encounter_message: String,
}

/// One entry of the static date destination menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateChoice {
    pub text: String,
    pub location: String,
}

// ============================================================================
// Dialogue trees
// ============================================================================

/// Player-facing prompts for one dialogue level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statements {
    pub compliment: String,
    pub introduction: String,
    pub question: String,
}

/// A scripted reply: the line spoken back and the opinion shift it causes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "(String, i32)", into = "(String, i32)")]
pub struct Reply {
    pub text: String,
    pub delta: i32,
}

impl From<(String, i32)> for Reply {
    fn from((text, delta): (String, i32)) -> Self {
        Self { text, delta }
    }
}

impl From<Reply> for (String, i32) {
    fn from(reply: Reply) -> Self {
        (reply.text, reply.delta)
    }
}

/// The full reply set a level can answer with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replies {
    pub compliment: Reply,
    pub introduction: Reply,
    pub question: Reply,
    pub observation: Reply,
}

/// One step of a conversation: what the player can say and what comes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub statement: Statements,
    pub reply: Replies,
}

/// A named conversation, levels sorted ascending by their numeric key.
#[derive(Debug, Clone)]
pub struct DialogueTree {
    levels: Vec<(u32, Level)>,
}

impl DialogueTree {
    fn from_raw(name: &str, raw: BTreeMap<String, Level>) -> Result<Self, ScriptError> {
        let mut levels = Vec::with_capacity(raw.len());
        for (key, level) in raw {
            let number: u32 = key.parse().map_err(|_| ScriptError::BadLevelKey {
                tree: name.to_string(),
                key: key.clone(),
            })?;
            levels.push((number, level));
        }
        levels.sort_by_key(|(number, _)| *number);
        for pair in levels.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ScriptError::DuplicateLevel {
                    tree: name.to_string(),
                    level: pair[0].0,
                });
            }
        }
        if levels.is_empty() {
            return Err(ScriptError::EmptyTree {
                tree: name.to_string(),
            });
        }
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Index of the final level. Valid because empty trees are rejected at load.
    pub fn last_index(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn level(&self, index: usize) -> Option<&(u32, Level)> {
        self.levels.get(index)
    }

    /// Level at `index`, clamped to the final level. Total because empty
    /// trees are rejected at load.
    pub fn level_clamped(&self, index: usize) -> &(u32, Level) {
        &self.levels[index.min(self.last_index())]
    }

    pub fn levels(&self) -> impl Iterator<Item = &(u32, Level)> {
        self.levels.iter()
    }
}

// ============================================================================
// Script
// ============================================================================

/// Shape the script file deserializes into before tree normalization.
#[derive(Debug, Deserialize)]
struct RawScript {
    ui: UiStrings,
    dialogue: DialogueText,
    dialogue_trees: BTreeMap<String, BTreeMap<String, Level>>,
    #[serde(default)]
    girls: BTreeMap<String, GirlScript>,
}

/// Per-girl overrides in the script's `girls` section.
#[derive(Debug, Deserialize)]
struct GirlScript {
    dialogue_tree: String,
}

/// The fully loaded, validated narrative script.
///
/// Immutable once constructed; the engine takes it by value at construction
/// rather than reading a process-wide cache.
#[derive(Debug, Clone)]
pub struct Script {
    pub ui: UiStrings,
    pub dialogue: DialogueText,
    trees: BTreeMap<String, DialogueTree>,
    girl_trees: BTreeMap<String, String>,
}

impl Script {
    /// The script compiled into the binary. Used whenever no script file is
    /// present, and as the merge base for partial scripts.
    pub fn embedded_default() -> Self {
        Self::from_value(default_value()).expect("embedded default script is valid")
    }

    /// Load the script from a directory, probing `script.yaml`, `script.yml`
    /// and `script.json` in order. A missing file falls back to the embedded
    /// default; a present file is deep-merged over it.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ScriptError> {
        for name in SCRIPT_FILES {
            let path = dir.as_ref().join(name);
            if path.exists() {
                return Self::load_file(&path);
            }
        }
        tracing::info!("no script file found, using embedded default");
        Ok(Self::embedded_default())
    }

    /// Load a specific script file, deep-merging missing keys from the
    /// embedded default.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut value: Value = if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        ) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        merge_missing(&mut value, &default_value());
        let script = Self::from_value(value)?;
        tracing::info!(path = %path.display(), trees = script.trees.len(), "loaded narrative script");
        Ok(script)
    }

    fn from_value(value: Value) -> Result<Self, ScriptError> {
        let raw: RawScript = serde_json::from_value(value)?;

        let mut trees = BTreeMap::new();
        for (name, levels) in raw.dialogue_trees {
            let tree = DialogueTree::from_raw(&name, levels)?;
            trees.insert(name, tree);
        }
        if !trees.contains_key(DEFAULT_TREE) {
            return Err(ScriptError::MissingDefaultTree);
        }
        if raw.dialogue.date_choices.is_empty() {
            return Err(ScriptError::NoDateChoices);
        }

        Ok(Self {
            ui: raw.ui,
            dialogue: raw.dialogue,
            trees,
            girl_trees: raw
                .girls
                .into_iter()
                .map(|(name, girl)| (name, girl.dialogue_tree))
                .collect(),
        })
    }

    pub fn tree(&self, name: &str) -> Option<&DialogueTree> {
        self.trees.get(name)
    }

    /// Dialogue tree name the `girls` section assigns to a girl, if any.
    pub fn girl_tree(&self, girl: &str) -> Option<&str> {
        self.girl_trees.get(girl).map(String::as_str)
    }

    pub fn default_tree(&self) -> &DialogueTree {
        &self.trees[DEFAULT_TREE]
    }

    /// Resolve a tree by name, falling back to the default tree for unknown
    /// names (a girl referencing a missing tree is a desync, not a crash).
    pub fn tree_or_default(&self, name: &str) -> &DialogueTree {
        self.trees.get(name).unwrap_or_else(|| self.default_tree())
    }
}

/// Fill keys missing from `value` with the corresponding entries of
/// `default`, recursing through nested objects. Existing values win.
fn merge_missing(value: &mut Value, default: &Value) {
    if let (Value::Object(map), Value::Object(defaults)) = (value, default) {
        for (key, default_entry) in defaults {
            match map.get_mut(key) {
                Some(entry) => merge_missing(entry, default_entry),
                None => {
                    map.insert(key.clone(), default_entry.clone());
                }
            }
        }
    }
}

/// The embedded default script, equivalent to shipping a complete
/// `script.json` inside the binary.
fn default_value() -> Value {
    serde_json::json!({
        "ui": {
            "general": {"continue_label": "Continue", "ellipsis": "…"},
            "dialogue": {
                "empty_scene": {"speaker": "", "text": "No one is here."}
            },
            "nav_overlay": {
                "location_placeholder": "—",
                "talk_label": " Talk: ",
                "talk_button": "Talk"
            },
            "main_window": {
                "title": "Long Twilight",
                "knowledge_title": "Knowledge"
            },
            "knowledge_pane": {
                "notes_tab": "Notes",
                "factions_tab": "Factions & Enclaves",
                "sites_tab": "Sites & Rumours",
                "tech_tab": "Tech & Lore"
            }
        },
        "dialogue": {
            "greeting": "Hey.",
            "choice_prompt": "Choose an approach:",
            "level_label": "Level",
            "opinion_label": "Opinion",
            "date_offer": "Do you want to go somewhere together?",
            "date_invite": "Where should we go?",
            "date_confirmation": "Okay, let’s do it.",
            "date_choices": [
                {"text": "Walk by the river", "location": "river"},
                {"text": "Grab a bite at the restaurant", "location": "restaurant"},
                {"text": "Hit the club", "location": "club"}
            ],
            "encounter_message": "You run into {name}."
        },
        "dialogue_trees": {
            "default": {
                "0": {
                    "statement": {
                        "compliment": "You look sharp today.",
                        "introduction": "Hi, I’m",
                        "question": "Rough day?"
                    },
                    "reply": {
                        "compliment": ["Thanks.", 1],
                        "introduction": ["Nice to meet you.", 1],
                        "question": ["Could be worse.", 0],
                        "observation": ["Mm-hmm.", 0]
                    }
                },
                "1": {
                    "statement": {
                        "compliment": "That colour suits you.",
                        "introduction": "I’m",
                        "question": "Coffee later?"
                    },
                    "reply": {
                        "compliment": ["You think?", 1],
                        "introduction": ["We’ve met now.", 1],
                        "question": ["Maybe.", 1],
                        "observation": ["Right.", 0]
                    }
                }
            }
        }
    })
}
