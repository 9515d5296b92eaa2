//! UI module for the TUI.

pub mod render;
pub mod theme;
