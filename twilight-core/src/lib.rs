//! Dating-sim narrative engine.
//!
//! This crate provides:
//! - A leveled dialogue tree walker with a per-focus cursor
//! - Choice resolution over acquaintance/opinion regimes
//! - The date sub-flow (pick a destination, confirm, resume)
//! - A small location graph with day transitions
//! - Script loading with an embedded default and deep-merge
//! - Session persistence
//!
//! # Quick Start
//!
//! ```
//! use twilight_core::{GameSession, SessionConfig};
//!
//! let config = SessionConfig::new("Protagonist")
//!     .with_seed(7)
//!     .with_starting_focus("tammy");
//! let mut session = GameSession::with_script(
//!     config,
//!     twilight_core::script::Script::embedded_default(),
//!     Default::default(),
//!     Default::default(),
//! );
//!
//! let payload = session.dialogue_payload();
//! assert!(!payload.options.is_empty());
//! session.apply_choice(payload.options[0].id);
//! ```

pub mod dialogue;
pub mod persist;
pub mod script;
pub mod session;
pub mod sheet;
pub mod world;

// Primary public API
pub use dialogue::{DateFlow, DialogueOption, DialoguePayload, DATE_THRESHOLD};
pub use persist::{PersistError, SavedSession};
pub use script::{Script, ScriptError};
pub use session::{
    ExitOption, GameSession, NavSnapshot, SessionConfig, SessionError, StatsSnapshot,
};
pub use sheet::{CharacterSheet, Knowledge};
