use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{StatusLine, StatusMessage};
use crate::common::text::truncate_with_ellipsis;

const KEY_HINTS: &[(&str, &str)] = &[
    ("Tab", "focus"),
    ("Enter", "open"),
    ("r", "reset"),
    ("s", "skip"),
    ("q", "quit"),
];

fn hint_spans() -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(KEY_HINTS.len() * 2);
    for (i, (key, label)) in KEY_HINTS.iter().enumerate() {
        let sep = if i == 0 { "" } else { "  " };
        spans.push(Span::styled(
            format!("{sep}{key}"),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw(format!(" {label}")));
    }
    spans
}

/// Renders the main status line.
pub fn render_status_line(message: Option<StatusMessage<'_>>, frame: &mut Frame, area: Rect) {
    let width = area.width as usize;
    let spans = match message {
        Some(StatusMessage::Diagnostic(text)) => vec![
            Span::styled("! ", Style::default().fg(Color::Red)),
            Span::styled(
                truncate_with_ellipsis(text, width.saturating_sub(2)),
                Style::default().fg(Color::Red),
            ),
        ],
        Some(StatusMessage::Tooltip(text)) => vec![
            Span::styled("» ", Style::default().fg(Color::Cyan)),
            Span::styled(
                truncate_with_ellipsis(text, width.saturating_sub(2)),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ],
        None => hint_spans(),
    };

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the debug line (frame rate and notebook counters).
pub fn render_debug_status_line(status: &StatusLine, frame: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let fps_color = if status.fps >= 50.0 {
        Color::Green
    } else if status.fps >= 25.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let line = Line::from(vec![
        Span::styled("fps ", dim),
        Span::styled(format!("{:.1}", status.fps), Style::default().fg(fps_color)),
        Span::styled("  cells ", dim),
        Span::raw(status.cells.to_string()),
        Span::styled("  typing ", dim),
        Span::raw(status.animating.to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
