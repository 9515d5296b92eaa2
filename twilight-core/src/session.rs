//! GameSession - the primary public API for the dating sim.
//!
//! Wraps the script, world, player ledger and dialogue cursor into a
//! single facade the UI talks to. The UI never mutates relationship state
//! directly; it asks for payloads and snapshots, and feeds back numeric
//! choice events. Every state transition happens synchronously inside one
//! `&mut self` call, so events are processed strictly one at a time.

use crate::dialogue::{regime, DateFlow, DialogueCursor, DialogueOption, DialoguePayload, Regime};
use crate::persist::{PersistError, SavedSession};
use crate::script::{Reply, Script, ScriptError, DEFAULT_TREE};
use crate::sheet::{CharacterSheet, Knowledge};
use crate::world::{Player, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Player character name.
    pub player_name: String,

    /// Directory holding `script.yaml`, `character.yaml`, `knowledge.yaml`.
    pub data_dir: PathBuf,

    /// RNG seed for deterministic observation rolls and girl movement.
    pub seed: Option<u64>,

    /// Girl to focus at startup.
    pub starting_focus: Option<String>,
}

impl SessionConfig {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            data_dir: PathBuf::from("game"),
            seed: None,
            starting_focus: None,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_starting_focus(mut self, girl: impl Into<String>) -> Self {
        self.starting_focus = Some(girl.into());
        self
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// A numbered exit in the navigation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitOption {
    pub id: i32,
    pub label: String,
}

/// What the UI shows for the navigation pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavSnapshot {
    pub location: String,
    pub exits: Vec<ExitOption>,
    /// Girls present at the player's location.
    pub characters: Vec<String>,
}

/// What the UI shows for the stats pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub mp: i32,
    pub stamina: i32,
    pub attrs: BTreeMap<String, i32>,
    pub skills: BTreeMap<String, i32>,
    pub conditions: Vec<String>,
    /// Girl key -> opinion score.
    pub affinity: BTreeMap<String, i32>,
    pub known_girls: Vec<String>,
}

// ============================================================================
// Session
// ============================================================================

/// A running game: script, world, player and conversation state.
pub struct GameSession {
    script: Script,
    world: World,
    player: Player,
    cursor: DialogueCursor,
    sheet: CharacterSheet,
    knowledge: Knowledge,
    rng: StdRng,
}

impl GameSession {
    /// Create a session, loading script and sheets from the configured data
    /// directory. Fails only on a malformed script.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let script = Script::load(&config.data_dir)?;
        let sheet = CharacterSheet::load(&config.data_dir);
        let knowledge = Knowledge::load(&config.data_dir);
        Ok(Self::with_script(config, script, sheet, knowledge))
    }

    /// Create a session around an already-loaded script. Lets tests and
    /// embedded deployments construct the engine without touching disk.
    pub fn with_script(
        config: SessionConfig,
        script: Script,
        sheet: CharacterSheet,
        knowledge: Knowledge,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut session = Self {
            script,
            world: World::standard(),
            player: Player::new(config.player_name),
            cursor: DialogueCursor::new(DEFAULT_TREE),
            sheet,
            knowledge,
            rng,
        };

        for girl in session.world.girls.values_mut() {
            girl.dialogue_tree = session.script.girl_tree(&girl.name).map(str::to_string);
        }

        // Day 1: everyone takes up her starting position.
        session.world.advance_day(&mut session.rng);
        if let Some(girl) = config.starting_focus {
            session.focus(&girl);
        }
        session
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn cursor(&self) -> &DialogueCursor {
        &self.cursor
    }

    pub fn sheet(&self) -> &CharacterSheet {
        &self.sheet
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    // -------- focus --------

    /// Focus a girl, restarting her conversation at level 0 of her assigned
    /// dialogue tree. An unknown key falls back to the first girl on the
    /// roster.
    pub fn focus(&mut self, girl: &str) {
        let key = if self.world.girls.contains_key(girl) {
            girl.to_string()
        } else if let Some(first) = self.world.girls.keys().next() {
            tracing::debug!(girl, fallback = %first, "focus on unknown girl");
            first.clone()
        } else {
            return;
        };
        let tree = self.world.girls[&key]
            .dialogue_tree
            .clone()
            .unwrap_or_else(|| DEFAULT_TREE.to_string());
        tracing::debug!(girl = %key, %tree, "focus changed");
        self.player.set_focus(Some(key));
        self.cursor.reset(tree);
    }

    pub fn clear_focus(&mut self) {
        self.player.set_focus(None);
        self.cursor.reset(DEFAULT_TREE);
    }

    // -------- dialogue --------

    /// Build the payload for the current beat of conversation. Observation
    /// labels are re-rolled on every call, so repeated calls differ unless
    /// the session was seeded.
    pub fn dialogue_payload(&mut self) -> DialoguePayload {
        let Some(girl_key) = self.player.focus().map(str::to_string) else {
            return self.empty_scene_payload();
        };

        let speaker = title_case(&girl_key);
        match self.cursor.flow {
            DateFlow::AwaitingDestination => DialoguePayload {
                speaker,
                text: self.script.dialogue.date_invite.clone(),
                options: self
                    .script
                    .dialogue
                    .date_choices
                    .iter()
                    .enumerate()
                    .map(|(i, choice)| DialogueOption::new(i as i32 + 1, choice.text.clone()))
                    .collect(),
            },
            DateFlow::AwaitingConfirmation => DialoguePayload {
                speaker,
                text: self.script.dialogue.date_confirmation.clone(),
                options: vec![DialogueOption::new(
                    1,
                    self.script.ui.general.continue_label.clone(),
                )],
            },
            DateFlow::Normal => self.normal_payload(&girl_key, speaker),
        }
    }

    fn normal_payload(&mut self, girl_key: &str, speaker: String) -> DialoguePayload {
        let opinion = self.world.girls[girl_key].opinion;
        let known = self.player.knows(girl_key);

        let (level_number, statement) = {
            let tree = self.script.tree_or_default(self.cursor.tree_name());
            let (number, level) = tree.level_clamped(self.cursor.index());
            (*number, level.statement.clone())
        };

        let text = {
            let dialogue = &self.script.dialogue;
            let header = format!(
                "{} {}\n{} {}",
                dialogue.level_label, level_number, dialogue.opinion_label, opinion
            );
            if self.cursor.index() == 0 {
                let encounter = dialogue.encounter_message.replace("{name}", &speaker);
                format!("{}\n\n{}\n\n{}", encounter, header, dialogue.greeting)
            } else {
                format!("{}\n\n{}", header, dialogue.greeting)
            }
        };

        let mut options = Vec::with_capacity(4);
        options.push(DialogueOption::new(1, statement.compliment.clone()));
        match regime(known, opinion) {
            Regime::Stranger => {
                options.push(DialogueOption::new(
                    2,
                    format!("{} {}", statement.introduction, self.player.name),
                ));
                options.push(DialogueOption::new(3, statement.question.clone()));
            }
            current @ (Regime::Acquaintance | Regime::Smitten) => {
                let observation = self.random_observation();
                options.push(DialogueOption::new(2, observation));
                options.push(DialogueOption::new(3, statement.question.clone()));
                if current == Regime::Smitten {
                    options.push(DialogueOption::new(
                        4,
                        self.script.dialogue.date_offer.clone(),
                    ));
                }
            }
        }

        DialoguePayload {
            speaker,
            text,
            options,
        }
    }

    fn empty_scene_payload(&self) -> DialoguePayload {
        let empty = &self.script.ui.dialogue.empty_scene;
        DialoguePayload {
            speaker: empty.speaker.clone(),
            text: empty.text.clone(),
            options: vec![DialogueOption::new(
                1,
                self.script.ui.general.continue_label.clone(),
            )],
        }
    }

    fn random_observation(&mut self) -> String {
        self.world
            .current_location()
            .observations
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| self.script.ui.general.ellipsis.clone())
    }

    /// Apply a chosen option id. Ids outside the currently offered set are
    /// silently ignored; the UI is the only input source and a stale click
    /// is expected, not an error. Returns transcript lines for the UI.
    pub fn apply_choice(&mut self, option_id: i32) -> Vec<String> {
        let Some(girl_key) = self.player.focus().map(str::to_string) else {
            return Vec::new();
        };

        match self.cursor.flow {
            DateFlow::AwaitingDestination => self.pick_destination(&girl_key, option_id),
            DateFlow::AwaitingConfirmation => self.acknowledge_date(),
            DateFlow::Normal => self.resolve_normal_choice(&girl_key, option_id),
        }
    }

    /// Destination step: whatever the id, clamp it into the menu range.
    fn pick_destination(&mut self, girl_key: &str, option_id: i32) -> Vec<String> {
        let choices = &self.script.dialogue.date_choices;
        let index = (option_id.max(1) as usize).min(choices.len()) - 1;
        let choice = choices[index].clone();

        self.world.make_date(&choice.location, girl_key);
        self.cursor.flow = DateFlow::AwaitingConfirmation;
        vec![self.script.dialogue.date_confirmation.clone()]
    }

    /// Acknowledgement step: resume normal flow, advance the one deferred
    /// level, and let the day roll over.
    fn acknowledge_date(&mut self) -> Vec<String> {
        self.cursor.flow = DateFlow::Normal;
        self.world.resolve_date();

        let tree = self.script.tree_or_default(self.cursor.tree_name());
        self.cursor.advance(tree);

        let mut lines = vec![self.world.current_location().description.clone()];
        lines.extend(self.world.advance_day(&mut self.rng));
        lines
    }

    fn resolve_normal_choice(&mut self, girl_key: &str, option_id: i32) -> Vec<String> {
        let known = self.player.knows(girl_key);
        let opinion = self.world.girls[girl_key].opinion;

        let tree = self.script.tree_or_default(self.cursor.tree_name());
        let (_, level) = tree.level_clamped(self.cursor.index());
        let replies = level.reply.clone();

        let reply: Reply = match (regime(known, opinion), option_id) {
            (_, 1) => replies.compliment,
            (Regime::Stranger, 2) => {
                self.player.make_acquaintance(girl_key);
                replies.introduction
            }
            (Regime::Acquaintance | Regime::Smitten, 2) => replies.observation,
            (_, 3) => replies.question,
            (Regime::Smitten, 4) => {
                // Date offer taken: suspend the regime table. The level
                // advance is deferred until the date is acknowledged.
                self.cursor.flow = DateFlow::AwaitingDestination;
                return vec![self.script.dialogue.date_invite.clone()];
            }
            _ => {
                tracing::debug!(option_id, "option outside offered set ignored");
                return Vec::new();
            }
        };

        if let Some(girl) = self.world.girls.get_mut(girl_key) {
            girl.opinion += reply.delta;
            tracing::debug!(girl = girl_key, delta = reply.delta, opinion = girl.opinion, "choice applied");
        }

        let tree = self.script.tree_or_default(self.cursor.tree_name());
        self.cursor.advance(tree);

        let mut lines = vec![reply.text];
        lines.extend(self.world.advance_day(&mut self.rng));
        lines
    }

    // -------- navigation --------

    pub fn nav_snapshot(&self) -> NavSnapshot {
        let location = self.world.current_location();
        NavSnapshot {
            location: location.key.clone(),
            exits: location
                .exits
                .keys()
                .enumerate()
                .map(|(i, label)| ExitOption {
                    id: i as i32 + 1,
                    label: label.clone(),
                })
                .collect(),
            characters: self
                .world
                .girls_here()
                .iter()
                .map(|girl| girl.name.clone())
                .collect(),
        }
    }

    /// Travel through a numbered exit. Out-of-range ids are ignored.
    pub fn travel_exit(&mut self, exit_id: i32) -> Vec<String> {
        if exit_id < 1 {
            return Vec::new();
        }
        let location = self.world.current_location();
        let Some(destination) = location.exits.values().nth(exit_id as usize - 1).cloned() else {
            return Vec::new();
        };
        self.travel(&destination)
    }

    pub fn travel(&mut self, key: &str) -> Vec<String> {
        self.world.travel(key)
    }

    // -------- stats --------

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            name: self.player.name.clone(),
            level: self.sheet.level,
            hp: self.sheet.hp,
            mp: self.sheet.mp,
            stamina: self.sheet.stamina,
            attrs: self.sheet.attrs.clone(),
            skills: self.sheet.skills.clone(),
            conditions: self.sheet.conditions.clone(),
            affinity: self
                .world
                .girls
                .values()
                .map(|girl| (girl.name.clone(), girl.opinion))
                .collect(),
            known_girls: self.player.known_girls().map(str::to_string).collect(),
        }
    }

    // -------- persistence --------

    /// Save the mutable session state. Failures are returned so the UI can
    /// report them; they never corrupt in-memory state.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let saved = SavedSession {
            focused: self.player.focus().map(str::to_string),
            known_girls: self.player.known_girls().map(str::to_string).collect(),
            opinions: self
                .world
                .girls
                .values()
                .map(|girl| (girl.name.clone(), girl.opinion))
                .collect(),
            location: Some(self.world.current_location().key.clone()),
        };
        saved.save_json(&path).await?;
        tracing::info!(path = %path.as_ref().display(), "session saved");
        Ok(())
    }

    /// Restore a saved session. A missing or corrupt file degrades to "no
    /// saved state": the session keeps running fresh and `false` is
    /// returned.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> bool {
        let saved = match SavedSession::load_json(&path).await {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!(path = %path.as_ref().display(), %err, "no usable save, starting fresh");
                return false;
            }
        };

        self.player.restore_known(saved.known_girls);
        for (name, opinion) in saved.opinions {
            if let Some(girl) = self.world.girls.get_mut(&name) {
                girl.opinion = opinion;
            }
        }
        if let Some(location) = saved.location {
            self.world.restore_location(&location);
        }
        match saved.focused {
            Some(girl) => self.focus(&girl),
            None => self.clear_focus(),
        }
        tracing::info!(path = %path.as_ref().display(), "session restored");
        true
    }
}

/// Uppercase the first letter, leaving the rest alone.
fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::DATE_THRESHOLD;
    use crate::sheet::{CharacterSheet, Knowledge};

    fn test_session() -> GameSession {
        let config = SessionConfig::new("Protagonist")
            .with_seed(42)
            .with_starting_focus("tammy");
        GameSession::with_script(
            config,
            Script::embedded_default(),
            CharacterSheet::default(),
            Knowledge::default(),
        )
    }

    #[test]
    fn test_stranger_gets_three_options() {
        let mut session = test_session();
        let payload = session.dialogue_payload();
        assert_eq!(payload.speaker, "Tammy");
        assert_eq!(payload.options.len(), 3);
        // The introduction line carries the player's name.
        assert!(payload.options[1].label.contains("Protagonist"));
    }

    #[test]
    fn test_introduction_marks_acquaintance_once() {
        let mut session = test_session();
        session.apply_choice(2);
        assert!(session.player().knows("tammy"));

        // Now acquainted, option 2 is an observation, not the introduction;
        // choosing it again cannot re-trigger the first-meeting reply.
        let payload = session.dialogue_payload();
        assert!(!payload.options[1].label.contains("Protagonist"));
        let lines = session.apply_choice(2);
        assert_ne!(lines[0], "Nice to meet you.");
    }

    #[test]
    fn test_option_four_gated_on_threshold() {
        let mut session = test_session();
        session.apply_choice(2); // introduce, opinion 0 -> 1

        while session.world().girls["tammy"].opinion < DATE_THRESHOLD {
            session.apply_choice(1);
        }
        let payload = session.dialogue_payload();
        assert_eq!(payload.options.len(), 4);
        assert!(payload.offers(4));
    }

    #[test]
    fn test_option_four_never_offered_below_threshold() {
        let mut session = test_session();
        session.apply_choice(2); // opinion 1, known
        let payload = session.dialogue_payload();
        assert_eq!(payload.options.len(), 3);
        assert!(!payload.offers(4));
    }

    #[test]
    fn test_out_of_range_option_is_noop() {
        let mut session = test_session();
        let index_before = session.cursor().index();
        let opinion_before = session.world().girls["tammy"].opinion;

        assert!(session.apply_choice(9).is_empty());
        assert_eq!(session.cursor().index(), index_before);
        assert_eq!(session.world().girls["tammy"].opinion, opinion_before);
    }

    #[test]
    fn test_option_four_as_stranger_is_noop() {
        let mut session = test_session();
        assert!(session.apply_choice(4).is_empty());
        assert_eq!(session.cursor().flow, DateFlow::Normal);
    }

    #[test]
    fn test_no_focus_payload_and_choice() {
        let mut session = test_session();
        session.clear_focus();

        let payload = session.dialogue_payload();
        assert_eq!(payload.text, "No one is here.");
        assert_eq!(payload.options.len(), 1);
        assert_eq!(payload.options[0].label, "Continue");
        assert!(session.apply_choice(1).is_empty());
    }

    #[test]
    fn test_focus_unknown_girl_falls_back_to_roster() {
        let mut session = test_session();
        session.focus("nobody");
        assert!(session.player().focus().is_some());
    }

    #[test]
    fn test_focus_resets_cursor() {
        let mut session = test_session();
        session.apply_choice(1);
        assert_eq!(session.cursor().index(), 1);
        session.focus("liz");
        assert_eq!(session.cursor().index(), 0);
    }

    #[test]
    fn test_choice_advances_exactly_one_level() {
        let mut session = test_session();
        assert_eq!(session.cursor().index(), 0);
        session.apply_choice(1);
        assert_eq!(session.cursor().index(), 1);
        // Default tree has two levels; further advances clamp.
        session.apply_choice(1);
        assert_eq!(session.cursor().index(), 1);
    }

    #[test]
    fn test_seeded_sessions_agree() {
        let mut a = test_session();
        let mut b = test_session();
        for _ in 0..5 {
            assert_eq!(a.dialogue_payload().options, b.dialogue_payload().options);
            a.apply_choice(1);
            b.apply_choice(1);
        }
    }

    #[test]
    fn test_nav_snapshot_lists_exits_and_girls() {
        let mut session = test_session();
        session.travel("bar");
        let nav = session.nav_snapshot();
        assert_eq!(nav.location, "bar");
        assert!(!nav.exits.is_empty());
        assert_eq!(nav.exits[0].id, 1);
    }

    #[test]
    fn test_travel_exit_out_of_range_is_noop() {
        let mut session = test_session();
        let here = session.nav_snapshot().location;
        assert!(session.travel_exit(99).is_empty());
        assert_eq!(session.nav_snapshot().location, here);
    }

    #[test]
    fn test_stats_snapshot_reflects_opinions() {
        let mut session = test_session();
        session.apply_choice(2);
        let stats = session.stats_snapshot();
        assert_eq!(stats.known_girls, vec!["tammy".to_string()]);
        assert_eq!(stats.affinity["tammy"], 1);
        assert_eq!(stats.name, "Protagonist");
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut session = test_session();
        session.apply_choice(2);
        session.apply_choice(1);
        let opinions_before: BTreeMap<String, i32> = session.stats_snapshot().affinity;
        session.save(&path).await.unwrap();

        let mut restored = test_session();
        assert!(restored.load(&path).await);
        assert_eq!(restored.stats_snapshot().affinity, opinions_before);
        assert!(restored.player().knows("tammy"));
        assert_eq!(restored.player().focus(), Some("tammy"));
    }

    #[tokio::test]
    async fn test_load_missing_save_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = test_session();
        assert!(!session.load(dir.path().join("absent.json")).await);
        // Session unchanged and still usable.
        assert_eq!(session.player().focus(), Some("tammy"));
    }
}
