//! Members view rendering.
//!
//! A table with one row per member slot, the cluster information panel and
//! the latest change of the selected slot.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{SlotState, StatsState};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the Members view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(5), Constraint::Length(8)]).split(area);
    render_table(frame, app, chunks[0]);

    let panels =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(chunks[1]);
    render_stats(frame, app, panels[0]);
    render_last_change(frame, app, panels[1]);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let now = Instant::now();

    let header = Row::new(vec![
        Cell::from("Node"),
        Cell::from("Member"),
        Cell::from("State"),
        Cell::from("Changes"),
        Cell::from("Net"),
        Cell::from("Rate"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .cluster
        .slots
        .iter()
        .map(|s| {
            let status = s.status(now);
            let (name, state) = s
                .member
                .as_ref()
                .map(|m| (m.name.clone(), m.state.clone()))
                .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
            let rate = s
                .trend
                .rate()
                .map(|r| format!("{:+.1}/s", r))
                .unwrap_or_else(|| "-".to_string());

            let row = Row::new(vec![
                Cell::from(s.slot.label()),
                Cell::from(name),
                Cell::from(state),
                Cell::from(s.changes_seen.to_string()),
                Cell::from(format_signed(s.net_change)),
                Cell::from(rate),
                Cell::from(render_sparkline(&s.trend.sparkline())),
                Cell::from(status.symbol()).style(app.theme.slot_style(status)),
            ]);
            if s.is_flashing(now) {
                row.style(Style::default().fg(app.theme.flash))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(8),
        Constraint::Min(10),
    ];

    let selected = app.selected_slot.min(app.cluster.slots.len().saturating_sub(1));
    let title = format!(" Replica Set Members ({}) ", app.cluster.slots.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !app.cluster.slots.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match &app.cluster.stats {
        StatsState::Available(stats) => {
            let mut lines: Vec<Line> = stats.to_string().lines().map(|l| Line::from(l.to_string())).collect();
            if let Some(rate) = app.cluster.totals.rate() {
                lines.push(Line::from(format!("- Rate: {:+.1} docs/s", rate)));
            }
            lines
        }
        StatsState::Unavailable(err) => vec![
            Line::from(Span::styled(
                "Cluster stats unavailable",
                Style::default().fg(app.theme.failure),
            )),
            Line::from(Span::styled(
                err.clone(),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ],
        StatsState::Pending => vec![Line::from("Waiting for cluster stats...")],
    };

    let block = Block::default()
        .title(" Cluster ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_last_change(frame: &mut Frame, app: &App, area: Rect) {
    let now = Instant::now();
    let slot = app.cluster.slots.get(app.selected_slot);

    let title = slot
        .map(|s| format!(" {} ", s.slot.label()))
        .unwrap_or_else(|| " Node ".to_string());
    let border_color = match slot {
        Some(s) if s.is_flashing(now) => app.theme.flash,
        _ => app.theme.border,
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(border_color));

    let lines = slot.map(|s| change_lines(app, s)).unwrap_or_default();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn change_lines(app: &App, slot: &SlotState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(ref failure) = slot.last_failure {
        lines.push(Line::from(Span::styled(
            format!("Snapshot failed: {failure}"),
            Style::default().fg(app.theme.failure),
        )));
    }

    let Some(ref event) = slot.last_change else {
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No changes observed",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        return lines;
    };

    for (key, delta) in &event.grown {
        lines.push(Line::from(Span::styled(
            format!("+{} {} ({} → {})", delta.magnitude(), key, delta.previous, delta.current),
            Style::default().fg(app.theme.growth),
        )));
    }
    for (key, delta) in &event.shrunk_or_removed {
        lines.push(Line::from(Span::styled(
            format!("-{} {} ({} → {})", delta.magnitude(), key, delta.previous, delta.current),
            Style::default().fg(app.theme.shrink),
        )));
    }
    lines
}

fn format_signed(n: i64) -> String {
    if n > 0 {
        format!("+{n}")
    } else {
        n.to_string()
    }
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    data.iter()
        .rev()
        .take(8)
        .rev()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}
