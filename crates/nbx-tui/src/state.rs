//! Application state owned by the runtime.

use std::time::Duration;

use nbx_core::{Datasets, TypingTiming};

use crate::features::notebook::NotebookState;
use crate::statusline::StatusLineAccumulator;

/// Startup knobs for the notebook screen.
#[derive(Debug, Clone)]
pub struct NotebookOptions {
    pub title: String,
    pub timing: TypingTiming,
    /// Start offset between cells that begin typing together.
    pub stagger: Duration,
    pub show_debug_status: bool,
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Self {
            title: "Welcome to Data Explorer".to_string(),
            timing: TypingTiming::default(),
            stagger: Duration::from_millis(200),
            show_debug_status: false,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub notebook: NotebookState,
    /// Last failed action, shown until the next successful one.
    pub diagnostic: Option<String>,
    pub status_line: StatusLineAccumulator,
    pub show_debug_status: bool,
    pub should_quit: bool,
    /// Incremented every tick; drives the cursor blink.
    pub tick: usize,
    /// Terminal size from the last frame event.
    pub size: (u16, u16),
}

/// Ticks per cursor blink phase.
const BLINK_TICKS: usize = 8;

impl AppState {
    pub fn new(datasets: Datasets, options: &NotebookOptions) -> Self {
        Self {
            notebook: NotebookState::new(
                datasets,
                &options.title,
                options.timing,
                options.stagger,
            ),
            diagnostic: None,
            status_line: StatusLineAccumulator::new(),
            show_debug_status: options.show_debug_status,
            should_quit: false,
            tick: 0,
            size: (0, 0),
        }
    }

    pub fn cursor_visible(&self) -> bool {
        (self.tick / BLINK_TICKS).is_multiple_of(2)
    }

    /// Tooltip of the hovered target, else the focused one.
    pub fn tooltip(&self) -> Option<String> {
        let target = self.notebook.hover.or(self.notebook.focus)?;
        self.notebook.tooltip_for(target)
    }
}
