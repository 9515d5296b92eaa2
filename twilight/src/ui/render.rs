//! Render orchestration for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, View};

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(8),    // main area
            Constraint::Length(6), // transcript
            Constraint::Length(1), // status
            Constraint::Length(1), // hotkeys
        ])
        .split(area);

    render_title(frame, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);

    match app.view {
        View::Dialogue => render_dialogue(frame, app, columns[0]),
        View::Nav => render_nav(frame, app, columns[0]),
        View::Stats => render_stats(frame, app, columns[0]),
        View::Knowledge => render_knowledge(frame, app, columns[0]),
    }
    render_sidebar(frame, app, columns[1]);

    render_transcript(frame, app, rows[2]);
    render_status(frame, app, rows[3]);
    render_hotkeys(frame, app, rows[4]);
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let title = &app.session.script().ui.main_window.title;
    let line = Line::from(vec![
        Span::styled(format!(" {title} "), app.theme.title_style()),
        Span::styled(
            format!("— day {} — {}", app.session.world().day, app.nav.location),
            app.theme.text_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_dialogue(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", app.payload.speaker),
            app.theme.speaker_style(),
        ))
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let option_rows = app.payload.options.len() as u16;
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(option_rows)])
        .split(inner);

    let text = Paragraph::new(app.payload.text.as_str())
        .style(app.theme.text_style())
        .wrap(Wrap { trim: false });
    frame.render_widget(text, parts[0]);

    let items: Vec<ListItem> = app
        .payload
        .options
        .iter()
        .map(|option| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}) ", option.id), app.theme.option_number_style()),
                Span::styled(option.label.clone(), app.theme.option_style()),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), parts[1]);
}

fn render_nav(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", app.nav.location))
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled("Exits:", app.theme.speaker_style()));
    for exit in &app.nav.exits {
        lines.push(Line::from(vec![
            Span::styled(format!("{}) ", exit.id), app.theme.option_number_style()),
            Span::styled(exit.label.clone(), app.theme.option_style()),
        ]));
    }
    lines.push(Line::raw(""));
    let talk_label = &app.session.script().ui.nav_overlay.talk_label;
    if app.nav.characters.is_empty() {
        let placeholder = &app.session.script().ui.nav_overlay.location_placeholder;
        lines.push(Line::styled(
            format!("{talk_label}{placeholder}"),
            app.theme.transcript_style(),
        ));
    } else {
        lines.push(Line::styled(
            format!("{talk_label}{}", app.nav.characters.join(", ")),
            app.theme.text_style(),
        ));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", app.stats.name))
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = &app.stats;
    let mut lines = vec![
        Line::raw(format!("Level {}", stats.level)),
        Line::raw(format!(
            "HP {}  MP {}  Stamina {}",
            stats.hp, stats.mp, stats.stamina
        )),
        Line::raw(""),
    ];
    for (attr, value) in &stats.attrs {
        lines.push(Line::raw(format!("{attr}: {value}")));
    }
    for (skill, value) in &stats.skills {
        lines.push(Line::raw(format!("{skill}: {value}")));
    }
    if !stats.conditions.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::raw(format!("Conditions: {}", stats.conditions.join(", "))));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .style(app.theme.text_style())
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn render_knowledge(frame: &mut Frame, app: &App, area: Rect) {
    let ui = &app.session.script().ui;
    let block = Block::default()
        .title(format!(" {} ", ui.main_window.knowledge_title))
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let knowledge = app.session.knowledge();
    let tabs = [
        (&ui.knowledge_pane.notes_tab, &knowledge.notes),
        (&ui.knowledge_pane.factions_tab, &knowledge.factions),
        (&ui.knowledge_pane.sites_tab, &knowledge.sites),
        (&ui.knowledge_pane.tech_tab, &knowledge.tech),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (tab, entries) in tabs {
        lines.push(Line::styled(tab.clone(), app.theme.speaker_style()));
        if entries.is_empty() {
            lines.push(Line::styled("  (nothing yet)", app.theme.transcript_style()));
        } else {
            for entry in entries {
                lines.push(Line::raw(format!("  - {entry}")));
            }
        }
        lines.push(Line::raw(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Right-hand column: the girls, their opinions, who is known.
fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Girls ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = app.session.player().focus().map(str::to_string);
    let items: Vec<ListItem> = app
        .stats
        .affinity
        .iter()
        .map(|(name, opinion)| {
            let known = app.stats.known_girls.iter().any(|g| g == name);
            let marker = if focused.as_deref() == Some(name.as_str()) {
                ">"
            } else {
                " "
            };
            let shown = if known {
                format!("{marker} {name} ({opinion})")
            } else {
                format!("{marker} {name} (?)")
            };
            ListItem::new(Span::styled(shown, app.theme.opinion_style(*opinion)))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Recently ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let lines: Vec<Line> = app
        .transcript
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|line| Line::styled(line.clone(), app.theme.transcript_style()))
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = app.status() {
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {message}"), app.theme.status_style())),
            area,
        );
    }
}

fn render_hotkeys(frame: &mut Frame, app: &App, area: Rect) {
    let hotkeys = " 1-9 choose | t talk | n nav | c stats | k knowledge | s save | q quit";
    frame.render_widget(
        Paragraph::new(Span::styled(hotkeys, app.theme.transcript_style())),
        area,
    );
}
