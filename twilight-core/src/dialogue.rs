//! The dialogue state machine: cursor, regimes, and the date sub-flow.
//!
//! A conversation walks a [`DialogueTree`](crate::script::DialogueTree) one
//! level at a time through a [`DialogueCursor`]. Which options a level
//! offers depends on the regime: whether the girl knows the player, and
//! whether her opinion has crossed the date threshold. The date sub-flow is
//! an explicit enum checked before the regime table, so the two extra
//! clicks of a date (pick a destination, acknowledge) never fall through to
//! normal choice handling, and a failure mid-flow cannot wedge the engine
//! in a sub-state.

use crate::script::DialogueTree;
use serde::{Deserialize, Serialize};

/// Opinion at or above this unlocks the date offer.
pub const DATE_THRESHOLD: i32 = 3;

/// Which row of the choice table applies to the focused girl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Not yet introduced: compliment / introduction / question.
    Stranger,
    /// Known, opinion below the threshold: compliment / observation / question.
    Acquaintance,
    /// Known, opinion at or above the threshold: the date offer appears.
    Smitten,
}

/// Classify a girl by acquaintance state and opinion.
pub fn regime(known: bool, opinion: i32) -> Regime {
    if !known {
        Regime::Stranger
    } else if opinion < DATE_THRESHOLD {
        Regime::Acquaintance
    } else {
        Regime::Smitten
    }
}

/// The date sub-flow. While not `Normal`, incoming option ids are
/// reinterpreted by the sub-flow instead of the regime table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFlow {
    #[default]
    Normal,
    /// The next choice picks a destination from the date menu.
    AwaitingDestination,
    /// The next choice acknowledges the confirmation and resumes dialogue.
    AwaitingConfirmation,
}

/// Per-focus conversation state: which tree, which level, and whether the
/// date sub-flow is live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueCursor {
    tree: String,
    index: usize,
    pub flow: DateFlow,
}

impl DialogueCursor {
    pub fn new(tree: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            index: 0,
            flow: DateFlow::Normal,
        }
    }

    pub fn tree_name(&self) -> &str {
        &self.tree
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Restart at level 0 of a (possibly different) tree. Called on every
    /// focus change.
    pub fn reset(&mut self, tree: impl Into<String>) {
        self.tree = tree.into();
        self.index = 0;
        self.flow = DateFlow::Normal;
    }

    /// Step one level forward, clamped to the final level. Repeating the
    /// final level forever is the intended end-of-tree behaviour.
    pub fn advance(&mut self, tree: &DialogueTree) {
        self.index = (self.index + 1).min(tree.last_index());
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A numbered option the player can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueOption {
    pub id: i32,
    pub label: String,
}

impl DialogueOption {
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// What the UI shows for one beat of conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialoguePayload {
    pub speaker: String,
    pub text: String,
    pub options: Vec<DialogueOption>,
}

impl DialoguePayload {
    /// Does this payload currently offer the given option id?
    pub fn offers(&self, id: i32) -> bool {
        self.options.iter().any(|opt| opt.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;

    #[test]
    fn test_regime_table() {
        assert_eq!(regime(false, 0), Regime::Stranger);
        // Opinion is irrelevant while unknown.
        assert_eq!(regime(false, 100), Regime::Stranger);
        assert_eq!(regime(true, -5), Regime::Acquaintance);
        assert_eq!(regime(true, 2), Regime::Acquaintance);
        assert_eq!(regime(true, 3), Regime::Smitten);
        assert_eq!(regime(true, 40), Regime::Smitten);
    }

    #[test]
    fn test_advance_clamps_at_last_level() {
        let script = Script::embedded_default();
        let tree = script.default_tree();
        let mut cursor = DialogueCursor::new("default");

        for _ in 0..10 {
            cursor.advance(tree);
        }
        assert_eq!(cursor.index(), tree.last_index());

        // Level content repeats at the end rather than overflowing.
        let (number, _) = tree.level_clamped(cursor.index());
        assert_eq!(*number, 1);
    }

    #[test]
    fn test_reset_returns_to_level_zero() {
        let script = Script::embedded_default();
        let tree = script.default_tree();
        let mut cursor = DialogueCursor::new("default");
        cursor.advance(tree);
        cursor.flow = DateFlow::AwaitingDestination;

        cursor.reset("default");
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.flow, DateFlow::Normal);
    }

    #[test]
    fn test_payload_offers() {
        let payload = DialoguePayload {
            speaker: "Tammy".to_string(),
            text: "Hey.".to_string(),
            options: vec![DialogueOption::new(1, "Hi"), DialogueOption::new(2, "Bye")],
        };
        assert!(payload.offers(1));
        assert!(!payload.offers(4));
    }
}
