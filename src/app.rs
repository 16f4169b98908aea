//! Application state and navigation logic.

use std::time::{Duration, Instant};

use clusterwatch_types::current_timestamp_ms;

use crate::data::{ActivityLog, ClusterView};
use crate::source::EventSource;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One row per member slot with status and trend.
    Members,
    /// Scrollable log of changes and failures.
    Activity,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Members => View::Activity,
            View::Activity => View::Members,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Members => "Members",
            View::Activity => "Activity",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Event source
    source: Box<dyn EventSource>,
    pub cluster: ClusterView,
    pub activity: ActivityLog,
    pub load_error: Option<String>,
    pub last_event: Option<Instant>,

    // Navigation state
    pub selected_slot: usize,
    /// Lines scrolled back from the newest activity entry.
    pub activity_scroll: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    rediscover_requested: bool,
}

impl App {
    /// Create a new App reading events from `source`.
    pub fn new(source: Box<dyn EventSource>, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Members,
            show_help: false,
            source,
            cluster: ClusterView::new(),
            activity: ActivityLog::new(),
            load_error: None,
            last_event: None,
            selected_slot: 0,
            activity_scroll: 0,
            theme,
            status_message: None,
            rediscover_requested: false,
        }
    }

    /// Returns a description of the current event source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < Duration::from_secs(3) => Some(msg),
            _ => None,
        }
    }

    /// Drain every pending event from the source.
    ///
    /// Returns the number of events applied.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.source.poll() {
            let now = Instant::now();
            self.cluster.apply(&event, now);
            self.activity.record(&event, current_timestamp_ms());
            self.last_event = Some(now);
            applied += 1;
        }

        self.load_error = self.source.error().map(str::to_string);

        let max = self.cluster.slots.len().saturating_sub(1);
        self.selected_slot = self.selected_slot.min(max);
        if applied > 0 && self.activity_scroll > 0 {
            // Keep the same entries in view while new ones arrive
            self.activity_scroll = (self.activity_scroll + applied).min(self.activity.len());
        }
        applied
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down (Members) or towards newer entries (Activity).
    pub fn select_next(&mut self) {
        match self.current_view {
            View::Members => {
                let max = self.cluster.slots.len().saturating_sub(1);
                self.selected_slot = (self.selected_slot + 1).min(max);
            }
            View::Activity => {
                self.activity_scroll = self.activity_scroll.saturating_sub(1);
            }
        }
    }

    /// Move selection up (Members) or back through older entries (Activity).
    pub fn select_prev(&mut self) {
        match self.current_view {
            View::Members => {
                self.selected_slot = self.selected_slot.saturating_sub(1);
            }
            View::Activity => {
                let max = self.activity.len().saturating_sub(1);
                self.activity_scroll = (self.activity_scroll + 1).min(max);
            }
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Ask the running monitor to discover the topology again.
    pub fn request_rediscover(&mut self) {
        self.rediscover_requested = true;
        self.set_status_message("Rediscovering replica set topology...".to_string());
    }

    /// Returns whether a rediscovery was requested since the last call.
    pub fn take_rediscover_request(&mut self) -> bool {
        std::mem::take(&mut self.rediscover_requested)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
