//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame` and never
//! return effects. The notebook pane refreshes its scroll metrics and hit
//! map through interior mutability while drawing.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin};

use crate::notebook;
use crate::state::AppState;
use crate::statusline::{StatusMessage, render_debug_status_line, render_status_line};

/// Height of the status line.
const STATUS_HEIGHT: u16 = 1;

/// Height of the debug status line (when enabled).
const DEBUG_STATUS_HEIGHT: u16 = 1;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let debug_height = if app.show_debug_status {
        DEBUG_STATUS_HEIGHT
    } else {
        0
    };

    let [notebook_area, status_area, debug_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(STATUS_HEIGHT),
        Constraint::Length(debug_height),
    ])
    .areas(frame.area());

    notebook::render_notebook(&app.notebook, frame, notebook_area, app.cursor_visible());

    let tooltip = app.tooltip();
    let message = app
        .diagnostic
        .as_deref()
        .map(StatusMessage::Diagnostic)
        .or_else(|| tooltip.as_deref().map(StatusMessage::Tooltip));
    let status_area = status_area.inner(Margin {
        horizontal: notebook::NOTEBOOK_MARGIN,
        vertical: 0,
    });
    render_status_line(message, frame, status_area);

    if app.show_debug_status {
        render_debug_status_line(&app.status_line.snapshot(), frame, debug_area);
    }
}
