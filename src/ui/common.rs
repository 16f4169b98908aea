//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::{SlotStatus, StatsState};

/// Render the header bar with a one-line cluster overview.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" CLUSTERWATCH ", Style::default().add_modifier(Modifier::BOLD));

    if app.cluster.slots.is_empty() {
        let status = match &app.cluster.topology_error {
            Some(err) => Span::styled(
                format!("| Topology unavailable: {err}"),
                Style::default().fg(app.theme.failure),
            ),
            None => Span::raw("| Discovering replica set..."),
        };
        frame.render_widget(Paragraph::new(Line::from(vec![title, status])), area);
        return;
    }

    let now = Instant::now();
    let changed = app
        .cluster
        .slots
        .iter()
        .filter(|s| s.status(now) == SlotStatus::Changed)
        .count();
    let failed = app
        .cluster
        .slots
        .iter()
        .filter(|s| s.status(now) == SlotStatus::Failed)
        .count();

    let documents = match &app.cluster.stats {
        StatsState::Available(stats) => format!("{} docs", format_count(stats.total_documents)),
        StatsState::Unavailable(_) => "stats unavailable".to_string(),
        StatsState::Pending => "-".to_string(),
    };

    let line = Line::from(vec![
        title,
        Span::raw("│ "),
        Span::styled(
            app.cluster.slots.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" nodes │ "),
        if changed > 0 {
            Span::styled(changed.to_string(), Style::default().fg(app.theme.growth))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" changed "),
        if failed > 0 {
            Span::styled(
                failed.to_string(),
                Style::default().fg(app.theme.failure).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" failed │ "),
        Span::raw(documents),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Members "), Line::from(" 2:Activity ")];

    let selected = match app.current_view {
        View::Members => 0,
        View::Activity => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, time since the last tick and the available controls,
/// or a temporary status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "↑↓:select Tab:switch R:rediscover ?:help q:quit";
    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit", err)
    } else if let Some(tick) = app.cluster.last_tick {
        format!(
            " {} | {} | Updated {:.1}s ago | {}",
            app.current_view.label(),
            app.source_description(),
            tick.elapsed().as_secs_f64(),
            controls
        )
    } else {
        format!(" Waiting for first tick... | {}", controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        section(" Navigation"),
        Line::from("  Tab       Switch view"),
        Line::from("  1 / 2     Members / Activity"),
        Line::from("  ↑↓ / jk   Select node or scroll log"),
        Line::from(""),
        section(" Cluster"),
        Line::from("  R         Rediscover topology"),
        Line::from(""),
        section(" General"),
        Line::from("  ?         Toggle help"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 17u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
