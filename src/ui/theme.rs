//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{ActivityLevel, SlotStatus};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for collections that grew.
    pub growth: Color,
    /// Color for collections that shrank or were removed.
    pub shrink: Color,
    /// Color for failures.
    pub failure: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Border color of a slot that just changed.
    pub flash: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            growth: Color::Green,
            shrink: Color::Yellow,
            failure: Color::Red,
            border: Color::Gray,
            flash: Color::LightGreen,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            growth: Color::Green,
            shrink: Color::Magenta,
            failure: Color::Red,
            border: Color::DarkGray,
            flash: Color::Green,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn slot_style(&self, status: SlotStatus) -> Style {
        match status {
            SlotStatus::Quiet => Style::default().add_modifier(Modifier::DIM),
            SlotStatus::Changed => Style::default().fg(self.growth).add_modifier(Modifier::BOLD),
            SlotStatus::Failed => Style::default().fg(self.failure).add_modifier(Modifier::BOLD),
        }
    }

    pub fn activity_style(&self, level: ActivityLevel) -> Style {
        match level {
            ActivityLevel::Info => Style::default().add_modifier(Modifier::BOLD),
            ActivityLevel::Growth => Style::default().fg(self.growth),
            ActivityLevel::Shrink => Style::default().fg(self.shrink),
            ActivityLevel::Error => Style::default().fg(self.failure),
        }
    }
}
