//! Notebook rendering.
//!
//! `build_lines` turns the notebook into styled lines plus the content
//! position of every interactive target. It is pure and independent of the
//! viewport; `render_notebook` slices it to the scroll window, draws it and
//! records screen hit boxes for mouse handling.

use nbx_core::cell::{DatasetPreview, FieldValue, ItemDetails, Output, OutputLink};
use nbx_core::segments::{Segment, segments};
use nbx_core::{AnimationState, Cell, Phase};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use unicode_width::UnicodeWidthStr;

use super::state::{Hit, NotebookState, TargetRef};
use super::style::{self, target_style};
use crate::common::text::{truncate_with_ellipsis, wrap_text};

/// Horizontal padding on each side of the notebook.
pub const NOTEBOOK_MARGIN: u16 = 1;

/// Columns reserved for the scrollbar.
const SCROLLBAR_WIDTH: u16 = 1;

/// Widest a preview table column may get.
const MAX_COLUMN_WIDTH: usize = 28;

const CURSOR_SYMBOL: &str = "█";

/// Content position of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTarget {
    pub line: usize,
    pub col: usize,
    pub width: usize,
    pub target: TargetRef,
}

/// The whole notebook laid out at a given width.
#[derive(Debug, Default)]
pub struct RenderedNotebook {
    pub lines: Vec<Line<'static>>,
    pub targets: Vec<PlacedTarget>,
}

/// One styled run inside an output row.
struct Piece {
    text: String,
    style: Style,
    target: Option<TargetRef>,
}

impl Piece {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            target: None,
        }
    }

    fn target(text: impl Into<String>, style: Style, target: TargetRef) -> Self {
        Self {
            text: text.into(),
            style,
            target: Some(target),
        }
    }
}

type Row = Vec<Piece>;

/// Accumulates lines and tracks the current column.
#[derive(Default)]
struct LineBuilder {
    out: RenderedNotebook,
    current: Vec<Span<'static>>,
    col: usize,
}

impl LineBuilder {
    fn push(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        self.col += text.width();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn push_target(&mut self, text: &str, style: Style, target: TargetRef) {
        if text.is_empty() {
            return;
        }
        self.out.targets.push(PlacedTarget {
            line: self.out.lines.len(),
            col: self.col,
            width: text.width(),
            target,
        });
        self.push(text, style);
    }

    fn push_piece(&mut self, piece: &Piece) {
        match piece.target {
            Some(target) => self.push_target(&piece.text, piece.style, target),
            None => self.push(&piece.text, piece.style),
        }
    }

    fn finish_line(&mut self) {
        self.out
            .lines
            .push(Line::from(std::mem::take(&mut self.current)));
        self.col = 0;
    }

    fn blank_line(&mut self) {
        self.finish_line();
    }
}

struct RenderContext<'a> {
    state: &'a NotebookState,
    width: usize,
    blink_on: bool,
}

impl RenderContext<'_> {
    fn decorate(&self, target: TargetRef, kind: nbx_core::SpanKind) -> Style {
        target_style(
            kind,
            self.state.focus == Some(target),
            self.state.hover == Some(target),
        )
    }
}

/// Lays out every cell at `width` columns.
pub fn build_lines(state: &NotebookState, width: usize, blink_on: bool) -> RenderedNotebook {
    let ctx = RenderContext {
        state,
        width,
        blink_on,
    };
    let mut builder = LineBuilder::default();

    for (index, cell) in state.session.cells().iter().enumerate() {
        let Some(anim) = state.animations.get(index).map(|a| a.state) else {
            continue;
        };
        render_code(&ctx, &mut builder, index, cell, &anim);
        if anim.is_output_visible() {
            render_output(&ctx, &mut builder, index, &cell.output);
        }
        builder.blank_line();
    }

    builder.out
}

fn render_code(
    ctx: &RenderContext<'_>,
    builder: &mut LineBuilder,
    index: usize,
    cell: &Cell,
    anim: &AnimationState,
) {
    let prompt = format!("In [{}]: ", index + 1);
    let indent = " ".repeat(prompt.width());
    let comment_lines: Vec<bool> = cell
        .code
        .split('\n')
        .map(|line| line.trim_start().starts_with('#'))
        .collect();

    builder.push(&prompt, style::IN_PROMPT);
    let mut line_idx = 0;

    for segment in segments(&cell.code, anim.revealed(), &cell.spans) {
        let target = match segment {
            Segment::Text(_) => None,
            Segment::Interactive { span, .. } => cell
                .spans
                .iter()
                .position(|s| std::ptr::eq(s, span))
                .filter(|_| span.action.is_some())
                .map(|pos| (TargetRef::span(index, pos), span.kind)),
        };

        for (i, piece) in segment.content().split('\n').enumerate() {
            if i > 0 {
                builder.finish_line();
                builder.push(&indent, Style::default());
                line_idx += 1;
            }
            match target {
                Some((target, kind)) => builder.push_target(piece, ctx.decorate(target, kind), target),
                None => {
                    let style = if comment_lines.get(line_idx).copied().unwrap_or(false) {
                        style::CODE_COMMENT
                    } else {
                        style::CODE
                    };
                    builder.push(piece, style);
                }
            }
        }
    }

    if matches!(anim.phase(), Phase::Pending | Phase::Typing) {
        let cursor = if ctx.blink_on { CURSOR_SYMBOL } else { " " };
        builder.push(cursor, style::CURSOR);
    }
    builder.finish_line();
}

fn render_output(ctx: &RenderContext<'_>, builder: &mut LineBuilder, index: usize, output: &Output) {
    let prompt = format!("Out [{}]: ", index + 1);
    let indent = " ".repeat(prompt.width());
    let avail = ctx.width.saturating_sub(prompt.width()).max(1);

    let rows = output_rows(ctx, index, output, avail);
    for (i, row) in rows.iter().enumerate() {
        if i == 0 {
            builder.push(&prompt, style::OUT_PROMPT);
        } else {
            builder.push(&indent, Style::default());
        }
        for piece in row {
            builder.push_piece(piece);
        }
        builder.finish_line();
    }
}

fn output_rows(ctx: &RenderContext<'_>, index: usize, output: &Output, avail: usize) -> Vec<Row> {
    let mut link_index = 0;
    let mut link = |link: &OutputLink| {
        let target = TargetRef::link(index, link_index);
        link_index += 1;
        Piece::target(link.label.clone(), ctx.decorate(target, link.kind), target)
    };

    match output {
        Output::Empty => Vec::new(),
        Output::Text(text) => wrap_text(text, avail)
            .into_iter()
            .map(|line| vec![Piece::new(line, style::CODE)])
            .collect(),
        Output::DatasetList { heading, entries } => {
            let mut rows = vec![vec![Piece::new(heading.clone(), style::HEADING)]];
            for entry in entries {
                let mut row = vec![Piece::new("  > ", style::MUTED), link(&entry.link)];
                if !entry.description.is_empty() {
                    row.push(Piece::new(format!("  {}", entry.description), style::MUTED));
                }
                rows.push(row);
            }
            rows
        }
        Output::DatasetPreview(preview) => preview_rows(preview, avail, &mut link),
        Output::ItemDetails(details) => detail_rows(details, avail, &mut link),
    }
}

fn preview_rows(
    preview: &DatasetPreview,
    avail: usize,
    link: &mut impl FnMut(&OutputLink) -> Piece,
) -> Vec<Row> {
    let mut rows = vec![vec![
        Piece::new("Dataset: ", style::HEADING),
        Piece::new(preview.name.clone(), style::HEADING),
    ]];
    for line in wrap_text(&preview.description, avail) {
        if !line.is_empty() {
            rows.push(vec![Piece::new(line, style::MUTED)]);
        }
    }

    if preview.rows.is_empty() {
        rows.push(vec![Piece::new("No data available", style::MUTED)]);
    } else {
        rows.push(Vec::new());
        rows.extend(table_rows(&preview.columns, &preview.rows));
    }

    if !preview.links.is_empty() {
        rows.push(Vec::new());
        rows.push(vec![Piece::new(
            "Click on any item for details:",
            style::MUTED,
        )]);
        for target in &preview.links {
            rows.push(vec![Piece::new("  • ", style::MUTED), link(target)]);
        }
    }
    rows
}

fn table_rows(columns: &[String], data: &[Vec<String>]) -> Vec<Row> {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            data.iter()
                .filter_map(|row| row.get(i))
                .map(|value| value.width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut rows = vec![format_row(
        columns.iter().map(String::as_str),
        &widths,
        style::TABLE_HEADER,
    )];
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    rows.push(vec![Piece::new(rule.join("─┼─"), style::MUTED)]);
    for data_row in data {
        let values = (0..columns.len()).map(|i| data_row.get(i).map_or("", String::as_str));
        rows.push(format_row(values, &widths, style::CODE));
    }
    rows
}

fn format_row<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize], text_style: Style) -> Row {
    let mut row = Vec::new();
    for (i, (value, width)) in values.zip(widths).enumerate() {
        if i > 0 {
            row.push(Piece::new(" │ ", style::MUTED));
        }
        let text = truncate_with_ellipsis(value, *width);
        let pad = width.saturating_sub(text.width());
        row.push(Piece::new(format!("{text}{}", " ".repeat(pad)), text_style));
    }
    row
}

fn detail_rows(
    details: &ItemDetails,
    avail: usize,
    link: &mut impl FnMut(&OutputLink) -> Piece,
) -> Vec<Row> {
    let mut rows = vec![vec![Piece::new(details.heading.clone(), style::HEADING)]];

    for (key, value) in &details.fields {
        match value {
            FieldValue::Scalar(text) => {
                let lead = key.width() + 2;
                let mut wrapped = wrap_text(text, avail.saturating_sub(lead)).into_iter();
                let first = wrapped.next().unwrap_or_default();
                rows.push(vec![
                    Piece::new(key.clone(), style::FIELD_KEY),
                    Piece::new(": ", style::MUTED),
                    Piece::new(first, style::CODE),
                ]);
                for rest in wrapped {
                    rows.push(vec![Piece::new(
                        format!("{}{rest}", " ".repeat(lead)),
                        style::CODE,
                    )]);
                }
            }
            FieldValue::List(items) => {
                rows.push(vec![
                    Piece::new(key.clone(), style::FIELD_KEY),
                    Piece::new(":", style::MUTED),
                ]);
                for item in items {
                    for (i, line) in wrap_text(item, avail.saturating_sub(4)).into_iter().enumerate() {
                        let bullet = if i == 0 { "  - " } else { "    " };
                        rows.push(vec![
                            Piece::new(bullet, style::MUTED),
                            Piece::new(line, style::CODE),
                        ]);
                    }
                }
            }
            FieldValue::Object(json) => {
                rows.push(vec![
                    Piece::new(key.clone(), style::FIELD_KEY),
                    Piece::new(":", style::MUTED),
                ]);
                for line in json.lines() {
                    rows.push(vec![Piece::new(format!("  {line}"), style::MUTED)]);
                }
            }
        }
    }

    if !details.related.is_empty() {
        rows.push(Vec::new());
        rows.push(vec![Piece::new("Related:", style::HEADING)]);
        for (label, target) in &details.related {
            rows.push(vec![
                Piece::new(format!("  {label}"), style::CODE),
                Piece::new(" → ", style::MUTED),
                link(target),
            ]);
        }
    }
    rows
}

/// Draws the notebook pane and refreshes the hit map.
pub fn render_notebook(state: &NotebookState, frame: &mut Frame, area: Rect, blink_on: bool) {
    let content = Rect {
        x: area.x + NOTEBOOK_MARGIN,
        y: area.y,
        width: area
            .width
            .saturating_sub(NOTEBOOK_MARGIN * 2 + SCROLLBAR_WIDTH),
        height: area.height,
    };
    let rendered = build_lines(state, content.width as usize, blink_on);
    let viewport = content.height as usize;
    let total = rendered.lines.len();

    state.scroll.update_metrics(total, viewport);
    let offset = state.scroll.offset();

    let right = content.x + content.width;
    let mut hits = Vec::new();
    for placed in &rendered.targets {
        if placed.line < offset || placed.line >= offset + viewport {
            continue;
        }
        let col_start = content.x.saturating_add(placed.col as u16).min(right);
        let col_end = col_start.saturating_add(placed.width as u16).min(right);
        if col_start < col_end {
            hits.push(Hit {
                row: content.y + (placed.line - offset) as u16,
                col_start,
                col_end,
                target: placed.target,
            });
        }
    }
    let lines = rendered
        .targets
        .iter()
        .map(|placed| (placed.target, placed.line))
        .collect();
    state.hits.replace(hits, lines);

    let visible: Vec<Line<'static>> = rendered
        .lines
        .into_iter()
        .skip(offset)
        .take(viewport)
        .collect();
    frame.render_widget(Paragraph::new(visible), content);

    if total > viewport {
        let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(viewport))
            .position(offset)
            .viewport_content_length(viewport);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area,
            &mut scrollbar_state,
        );
    }
}
