//! Color theme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Game UI color theme.
#[derive(Debug, Clone)]
pub struct GameTheme {
    pub foreground: Color,
    pub border: Color,
    pub title: Color,

    pub speaker: Color,
    pub option: Color,
    pub option_number: Color,
    pub transcript: Color,
    pub status: Color,

    pub opinion_low: Color,
    pub opinion_high: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            title: Color::Magenta,

            speaker: Color::Yellow,
            option: Color::White,
            option_number: Color::Cyan,
            transcript: Color::Gray,
            status: Color::LightGreen,

            opinion_low: Color::DarkGray,
            opinion_high: Color::LightMagenta,
        }
    }
}

impl GameTheme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn speaker_style(&self) -> Style {
        Style::default()
            .fg(self.speaker)
            .add_modifier(Modifier::BOLD)
    }

    pub fn option_style(&self) -> Style {
        Style::default().fg(self.option)
    }

    pub fn option_number_style(&self) -> Style {
        Style::default()
            .fg(self.option_number)
            .add_modifier(Modifier::BOLD)
    }

    pub fn transcript_style(&self) -> Style {
        Style::default()
            .fg(self.transcript)
            .add_modifier(Modifier::DIM)
    }

    pub fn status_style(&self) -> Style {
        Style::default().fg(self.status)
    }

    /// Opinion scores colour up once a girl warms past the date threshold.
    pub fn opinion_style(&self, opinion: i32) -> Style {
        if opinion >= twilight_core::DATE_THRESHOLD {
            Style::default().fg(self.opinion_high)
        } else {
            Style::default().fg(self.opinion_low)
        }
    }
}
