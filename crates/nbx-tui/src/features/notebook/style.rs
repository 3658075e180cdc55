//! Notebook colors.

use std::sync::LazyLock;

use enum_map::{EnumMap, enum_map};
use nbx_core::SpanKind;
use ratatui::style::{Color, Modifier, Style};

/// Look of each interactive span kind, shared by code spans and output links.
pub static SPAN_STYLES: LazyLock<EnumMap<SpanKind, Style>> = LazyLock::new(|| {
    enum_map! {
        SpanKind::Keyword => Style::new().fg(Color::Magenta).add_modifier(Modifier::UNDERLINED),
        SpanKind::Function => Style::new().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
        SpanKind::Comment => Style::new().fg(Color::Green).add_modifier(Modifier::UNDERLINED | Modifier::ITALIC),
    }
});

pub const IN_PROMPT: Style = Style::new().fg(Color::Blue).add_modifier(Modifier::BOLD);
pub const OUT_PROMPT: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
pub const CODE: Style = Style::new().fg(Color::White);
pub const CODE_COMMENT: Style = Style::new().fg(Color::DarkGray);
pub const CURSOR: Style = Style::new().fg(Color::Gray);
pub const HEADING: Style = Style::new().add_modifier(Modifier::BOLD);
pub const MUTED: Style = Style::new().fg(Color::DarkGray);
pub const TABLE_HEADER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const FIELD_KEY: Style = Style::new().fg(Color::Cyan);

/// Style for a target, with focus and hover layered on top.
pub fn target_style(kind: SpanKind, focused: bool, hovered: bool) -> Style {
    let mut style = SPAN_STYLES[kind];
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if hovered {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_style_layers_on_shared_table() {
        let base = SPAN_STYLES[SpanKind::Function];
        assert_eq!(target_style(SpanKind::Function, false, false), base);
        assert_eq!(
            target_style(SpanKind::Function, true, true),
            base.add_modifier(Modifier::REVERSED | Modifier::BOLD)
        );
        assert_ne!(SPAN_STYLES[SpanKind::Keyword], SPAN_STYLES[SpanKind::Comment]);
    }
}
