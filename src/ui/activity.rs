//! Activity log view.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::activity::format_clock;

/// Render the activity log, newest entry at the bottom.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let total = app.activity.len();
    let end = total.saturating_sub(app.activity_scroll);
    let start = end.saturating_sub(visible);

    let lines: Vec<Line> = app
        .activity
        .iter()
        .skip(start)
        .take(end - start)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", format_clock(entry.timestamp_ms)),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(entry.message.clone(), app.theme.activity_style(entry.level)),
            ])
        })
        .collect();

    let scroll_info = if app.activity_scroll > 0 {
        format!(" [-{}]", app.activity_scroll)
    } else {
        String::new()
    };
    let title = format!(" Activity ({}){} ", total, scroll_info);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
