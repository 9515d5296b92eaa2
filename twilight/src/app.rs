//! Main application state and logic.

use std::path::PathBuf;

use twilight_core::{DialoguePayload, GameSession, NavSnapshot, StatsSnapshot};

use crate::ui::theme::GameTheme;

/// Transcript lines kept in memory; older lines scroll off.
const MAX_TRANSCRIPT_LINES: usize = 300;

/// Which pane fills the main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dialogue,
    Nav,
    Stats,
    Knowledge,
}

/// Main application state.
pub struct App {
    pub session: GameSession,

    // Cached engine output for rendering.
    pub payload: DialoguePayload,
    pub nav: NavSnapshot,
    pub stats: StatsSnapshot,

    // UI state
    pub theme: GameTheme,
    pub view: View,
    pub transcript: Vec<String>,
    status_message: Option<String>,

    pub save_path: PathBuf,
}

impl App {
    pub fn new(mut session: GameSession, save_path: PathBuf) -> Self {
        let payload = session.dialogue_payload();
        let nav = session.nav_snapshot();
        let stats = session.stats_snapshot();
        Self {
            session,
            payload,
            nav,
            stats,
            theme: GameTheme::default(),
            view: View::default(),
            transcript: Vec::new(),
            status_message: None,
            save_path,
        }
    }

    /// Re-pull everything the panes render from the engine.
    pub fn refresh(&mut self) {
        self.payload = self.session.dialogue_payload();
        self.nav = self.session.nav_snapshot();
        self.stats = self.session.stats_snapshot();
    }

    /// Apply a numbered dialogue choice.
    pub fn choose(&mut self, option_id: i32) {
        let lines = self.session.apply_choice(option_id);
        self.record(lines);
        self.refresh();
    }

    /// Travel through a numbered exit from the navigation pane.
    pub fn travel(&mut self, exit_id: i32) {
        let lines = self.session.travel_exit(exit_id);
        self.record(lines);
        self.refresh();
    }

    /// Append transcript lines, dropping the oldest past the cap.
    fn record(&mut self, lines: Vec<String>) {
        self.transcript.extend(lines);
        if self.transcript.len() > MAX_TRANSCRIPT_LINES {
            let excess = self.transcript.len() - MAX_TRANSCRIPT_LINES;
            self.transcript.drain(..excess);
        }
    }

    /// Focus the next girl present at the current location, cycling through
    /// them on repeated presses. No-op when the street is empty.
    pub fn talk_to_next(&mut self) {
        let here = self.nav.characters.clone();
        if here.is_empty() {
            self.set_status("No one to talk to here.");
            return;
        }
        let next = match self.session.player().focus() {
            Some(current) => {
                let position = here.iter().position(|name| name == current);
                match position {
                    Some(i) => here[(i + 1) % here.len()].clone(),
                    None => here[0].clone(),
                }
            }
            None => here[0].clone(),
        };
        self.session.focus(&next);
        self.view = View::Dialogue;
        self.refresh();
    }

    /// Persist the session, reporting the outcome on the status line. Save
    /// failures never end the session.
    pub async fn save(&mut self) {
        match self.session.save(&self.save_path).await {
            Ok(()) => self.set_status(format!("Saved to {}.", self.save_path.display())),
            Err(err) => {
                tracing::warn!(%err, path = %self.save_path.display(), "save failed");
                self.set_status(format!("Save failed: {err}"));
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twilight_core::script::Script;
    use twilight_core::{GameSession, SessionConfig};

    fn test_app() -> App {
        let config = SessionConfig::new("Protagonist")
            .with_seed(3)
            .with_starting_focus("tammy");
        let session = GameSession::with_script(
            config,
            Script::embedded_default(),
            Default::default(),
            Default::default(),
        );
        App::new(session, PathBuf::from("unused.json"))
    }

    #[test]
    fn test_transcript_stays_bounded() {
        let mut app = test_app();
        for i in 0..1000 {
            app.record(vec![format!("line {i}")]);
        }
        assert_eq!(app.transcript.len(), MAX_TRANSCRIPT_LINES);
        // The newest lines survive the trim.
        assert_eq!(app.transcript.last().unwrap(), "line 999");
    }
}
