//! Event handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, View};

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// The caller should await an async save.
    Save,
}

/// Handle a terminal event.
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }
    app.clear_status();

    match key.code {
        KeyCode::Char('q') => EventResult::Quit,
        KeyCode::Char('s') => EventResult::Save,

        // View switching
        KeyCode::Char('n') => {
            app.view = View::Nav;
            EventResult::NeedsRedraw
        }
        KeyCode::Char('c') => {
            app.view = View::Stats;
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') => {
            app.view = View::Knowledge;
            EventResult::NeedsRedraw
        }
        KeyCode::Esc | KeyCode::Char('d') => {
            app.view = View::Dialogue;
            EventResult::NeedsRedraw
        }

        // Talk to whoever is around
        KeyCode::Char('t') => {
            app.talk_to_next();
            EventResult::NeedsRedraw
        }

        // Numbered choices: dialogue options or exits, depending on view
        KeyCode::Char(c @ '1'..='9') => {
            let id = c as i32 - '0' as i32;
            match app.view {
                View::Dialogue => app.choose(id),
                View::Nav => app.travel(id),
                View::Stats | View::Knowledge => return EventResult::Continue,
            }
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::path::PathBuf;
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

    fn press(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert_eq!(handle_event(&mut app, press('q')), EventResult::Quit);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(handle_event(&mut app, ctrl_c), EventResult::Quit);
    }

    #[test]
    fn test_digit_routes_by_view() {
        let mut app = test_app();

        // Dialogue view: digit applies a choice and the cursor moves.
        handle_event(&mut app, press('2'));
        assert!(app.session.player().knows("tammy"));

        // Nav view: digit travels instead.
        handle_event(&mut app, press('n'));
        assert_eq!(app.view, View::Nav);
        let before = app.nav.location.clone();
        handle_event(&mut app, press('1'));
        assert_ne!(app.nav.location, before);
    }

    #[test]
    fn test_save_key_defers_to_caller() {
        let mut app = test_app();
        assert_eq!(handle_event(&mut app, press('s')), EventResult::Save);
    }

    #[test]
    fn test_escape_returns_to_dialogue() {
        let mut app = test_app();
        handle_event(&mut app, press('k'));
        assert_eq!(app.view, View::Knowledge);
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        handle_event(&mut app, esc);
        assert_eq!(app.view, View::Dialogue);
    }
}
