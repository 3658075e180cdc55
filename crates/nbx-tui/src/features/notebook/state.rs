//! Notebook view state.
//!
//! Wraps the core [`NotebookSession`] with everything the screen needs:
//! per-cell animation progress, scroll position, keyboard focus and the
//! click map produced by the last render.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use nbx_core::cell::Cell as NotebookCell;
use nbx_core::segments::segments;
use nbx_core::{Action, AnimationState, Datasets, NotebookSession, ScheduleId, TypingTiming};

/// Lines moved per mouse wheel notch.
pub const MOUSE_SCROLL_LINES: usize = 3;

/// Which interactive element of a cell a target refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    /// Index into the cell's code spans.
    Span(usize),
    /// Index into the cell's output links.
    Link(usize),
}

/// Stable reference to one interactive element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub cell: usize,
    pub slot: TargetSlot,
}

impl TargetRef {
    pub fn span(cell: usize, index: usize) -> Self {
        Self {
            cell,
            slot: TargetSlot::Span(index),
        }
    }

    pub fn link(cell: usize, index: usize) -> Self {
        Self {
            cell,
            slot: TargetSlot::Link(index),
        }
    }
}

/// Animation progress plus the schedule currently allowed to drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAnimation {
    pub state: AnimationState,
    /// Events tagged with any other id are stale and dropped.
    pub schedule: Option<ScheduleId>,
}

impl CellAnimation {
    pub fn pending(len: usize) -> Self {
        Self {
            state: AnimationState::new(len),
            schedule: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Pinned to the bottom; new cells stay in view.
    #[default]
    FollowLatest,
    /// Fixed line offset from the top.
    Anchored { offset: usize },
}

/// Vertical scroll position.
///
/// Content and viewport heights are recorded by the renderer, which is the
/// only place that knows the wrapped line count.
#[derive(Debug, Default)]
pub struct ScrollState {
    pub mode: ScrollMode,
    content_lines: Cell<usize>,
    viewport_lines: Cell<usize>,
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        self.mode == ScrollMode::FollowLatest
    }

    pub fn update_metrics(&self, content_lines: usize, viewport_lines: usize) {
        self.content_lines.set(content_lines);
        self.viewport_lines.set(viewport_lines);
    }

    pub fn viewport_lines(&self) -> usize {
        self.viewport_lines.get()
    }

    fn max_offset(&self) -> usize {
        self.content_lines
            .get()
            .saturating_sub(self.viewport_lines.get())
    }

    /// First visible line.
    pub fn offset(&self) -> usize {
        match self.mode {
            ScrollMode::FollowLatest => self.max_offset(),
            ScrollMode::Anchored { offset } => offset.min(self.max_offset()),
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let offset = self.offset().saturating_sub(lines);
        self.mode = ScrollMode::Anchored { offset };
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let offset = self.offset() + lines;
        self.mode = if offset >= self.max_offset() {
            ScrollMode::FollowLatest
        } else {
            ScrollMode::Anchored { offset }
        };
    }

    /// Scrolls the minimum needed to bring `line` into view.
    pub fn reveal_line(&mut self, line: usize) {
        let offset = self.offset();
        let viewport = self.viewport_lines.get().max(1);
        if line < offset {
            self.mode = ScrollMode::Anchored { offset: line };
        } else if line >= offset + viewport {
            self.scroll_down(line + 1 - offset - viewport);
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.mode = ScrollMode::Anchored { offset: 0 };
    }

    pub fn follow(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }
}

/// Screen rectangle (one row high) covered by a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub row: u16,
    pub col_start: u16,
    pub col_end: u16,
    pub target: TargetRef,
}

/// Maps screen positions to targets.
///
/// Rebuilt on each render; `RefCell` lets the immutable render pass fill it.
/// Also remembers the content line of every target, visible or not, so
/// keyboard focus can scroll to it.
#[derive(Debug, Default)]
pub struct HitMap {
    hits: RefCell<Vec<Hit>>,
    lines: RefCell<Vec<(TargetRef, usize)>>,
}

impl HitMap {
    pub fn replace(&self, hits: Vec<Hit>, lines: Vec<(TargetRef, usize)>) {
        *self.hits.borrow_mut() = hits;
        *self.lines.borrow_mut() = lines;
    }

    pub fn clear(&self) {
        self.hits.borrow_mut().clear();
        self.lines.borrow_mut().clear();
    }

    /// Content line a target was last rendered on.
    pub fn line_of(&self, target: TargetRef) -> Option<usize> {
        self.lines
            .borrow()
            .iter()
            .find(|(t, _)| *t == target)
            .map(|(_, line)| *line)
    }

    pub fn target_at(&self, col: u16, row: u16) -> Option<TargetRef> {
        self.hits
            .borrow()
            .iter()
            .find(|hit| hit.row == row && (hit.col_start..hit.col_end).contains(&col))
            .map(|hit| hit.target)
    }

    pub fn len(&self) -> usize {
        self.hits.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.borrow().is_empty()
    }
}

/// Everything the notebook pane reads and the reducer mutates.
#[derive(Debug)]
pub struct NotebookState {
    pub datasets: Datasets,
    pub session: NotebookSession,
    /// One entry per session cell, same order.
    pub animations: Vec<CellAnimation>,
    pub timing: TypingTiming,
    /// Extra start delay per cell when several start together.
    pub stagger: Duration,
    pub scroll: ScrollState,
    pub focus: Option<TargetRef>,
    pub hover: Option<TargetRef>,
    pub hits: HitMap,
}

impl NotebookState {
    pub fn new(datasets: Datasets, title: &str, timing: TypingTiming, stagger: Duration) -> Self {
        let session = NotebookSession::new(vec![NotebookCell::welcome(title, &datasets)]);
        let animations = Self::pending_animations(&session);
        Self {
            datasets,
            session,
            animations,
            timing,
            stagger,
            scroll: ScrollState::default(),
            focus: None,
            hover: None,
            hits: HitMap::default(),
        }
    }

    pub(crate) fn pending_animations(session: &NotebookSession) -> Vec<CellAnimation> {
        session
            .cells()
            .iter()
            .map(|cell| CellAnimation::pending(cell.code_len()))
            .collect()
    }

    pub fn cell(&self, index: usize) -> Option<(&NotebookCell, &AnimationState)> {
        Some((
            self.session.cells().get(index)?,
            &self.animations.get(index)?.state,
        ))
    }

    /// Cells still typing or waiting for their output.
    pub fn animating_count(&self) -> usize {
        self.animations
            .iter()
            .filter(|anim| !anim.state.is_output_visible())
            .count()
    }

    pub fn is_animating(&self) -> bool {
        self.animating_count() > 0
    }

    /// Currently interactive targets in reading order.
    ///
    /// Code spans count once the reveal cursor has passed their start; output
    /// links once the output is visible.
    pub fn targets(&self) -> Vec<TargetRef> {
        let mut out = Vec::new();
        for (index, (cell, anim)) in self
            .session
            .cells()
            .iter()
            .zip(&self.animations)
            .enumerate()
        {
            for segment in segments(&cell.code, anim.state.revealed(), &cell.spans) {
                let Some(span) = segment.span() else {
                    continue;
                };
                if let Some(pos) = cell.spans.iter().position(|s| std::ptr::eq(s, span))
                    && span.action.is_some()
                {
                    out.push(TargetRef::span(index, pos));
                }
            }
            if anim.state.is_output_visible() {
                let links = cell.output.links().len();
                out.extend((0..links).map(|link| TargetRef::link(index, link)));
            }
        }
        out
    }

    pub fn action_for(&self, target: TargetRef) -> Option<&Action> {
        let cell = self.session.cells().get(target.cell)?;
        match target.slot {
            TargetSlot::Span(i) => cell.spans.get(i)?.action.as_ref(),
            TargetSlot::Link(i) => cell.output.links().get(i).copied().map(|link| &link.action),
        }
    }

    /// Text shown in the status line while a target is focused or hovered.
    pub fn tooltip_for(&self, target: TargetRef) -> Option<String> {
        let cell = self.session.cells().get(target.cell)?;
        match target.slot {
            TargetSlot::Span(i) => {
                let span = cell.spans.get(i)?;
                span.tooltip
                    .clone()
                    .or_else(|| span.action.as_ref().map(describe_action))
            }
            TargetSlot::Link(i) => cell
                .output
                .links()
                .get(i)
                .map(|link| describe_action(&link.action)),
        }
    }
}

fn describe_action(action: &Action) -> String {
    match action {
        Action::LoadDataset { dataset } => format!("Load {dataset} dataset"),
        Action::ExploreItem { dataset, item_id } => {
            format!("Explore {item_id} in {dataset}")
        }
        Action::Custom(custom) => custom.label().to_string(),
    }
}
