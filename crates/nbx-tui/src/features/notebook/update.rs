//! Notebook reducer helpers.
//!
//! Called from the top-level reducer; they mutate [`NotebookState`] and return
//! effects for the runtime. Nothing here touches the terminal or spawns tasks.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use nbx_core::{DispatchError, Dispatched, Dispatcher, ScheduleId, TypingEvent};

use super::state::{CellAnimation, MOUSE_SCROLL_LINES, NotebookState, TargetRef};
use crate::effects::UiEffect;

/// Starts typing every cell, staggered by position.
pub fn start_all(nb: &NotebookState) -> Vec<UiEffect> {
    nb.animations
        .iter()
        .enumerate()
        .map(|(cell, anim)| UiEffect::StartTyping {
            cell,
            len: anim.state.len(),
            timing: nb.timing.delayed_by(nb.stagger * stagger_factor(cell)),
        })
        .collect()
}

fn stagger_factor(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Records the schedule now allowed to drive `cell`.
pub fn handle_scheduled(nb: &mut NotebookState, cell: usize, schedule: ScheduleId) {
    if let Some(anim) = nb.animations.get_mut(cell) {
        anim.schedule = Some(schedule);
    }
}

/// Applies a typing event. Events from stale schedules are dropped.
///
/// Returns true if the cell's animation changed.
pub fn handle_typing(
    nb: &mut NotebookState,
    cell: usize,
    schedule: ScheduleId,
    event: TypingEvent,
) -> bool {
    let Some(anim) = nb.animations.get_mut(cell) else {
        return false;
    };
    if anim.schedule != Some(schedule) {
        tracing::trace!(cell, ?schedule, ?event, "dropping stale typing event");
        return false;
    }
    anim.state.apply(event)
}

/// Runs the action behind `target`.
///
/// An appended cell gets a pending animation, starts typing without stagger
/// and the view follows it.
pub fn activate(nb: &mut NotebookState, target: TargetRef) -> Result<Vec<UiEffect>, DispatchError> {
    let Some(action) = nb.action_for(target).cloned() else {
        return Ok(vec![]);
    };

    match Dispatcher::new(&nb.datasets).dispatch(&action, &mut nb.session)? {
        Dispatched::Appended(index) => {
            let len = nb.session.cells().get(index).map_or(0, |cell| cell.code_len());
            nb.animations.push(CellAnimation::pending(len));
            nb.scroll.follow();
            Ok(vec![UiEffect::StartTyping {
                cell: index,
                len,
                timing: nb.timing,
            }])
        }
        Dispatched::Invoked => Ok(vec![]),
    }
}

/// Activates the keyboard-focused target, if any.
pub fn activate_focused(nb: &mut NotebookState) -> Result<Vec<UiEffect>, DispatchError> {
    match nb.focus {
        Some(target) => activate(nb, target),
        None => Ok(vec![]),
    }
}

/// Restores the initial cells and replays their animation.
pub fn reset(nb: &mut NotebookState) -> Vec<UiEffect> {
    nb.session.reset();
    nb.animations = NotebookState::pending_animations(&nb.session);
    nb.focus = None;
    nb.hover = None;
    nb.hits.clear();
    nb.scroll.scroll_to_top();

    let mut effects = vec![UiEffect::CancelAllTyping];
    effects.extend(start_all(nb));
    effects
}

/// Finishes every animation at once.
pub fn skip_all(nb: &mut NotebookState) -> Vec<UiEffect> {
    let mut skipped = false;
    for anim in &mut nb.animations {
        skipped |= anim.state.skip();
        anim.schedule = None;
    }
    if skipped {
        vec![UiEffect::CancelAllTyping]
    } else {
        vec![]
    }
}

pub fn focus_next(nb: &mut NotebookState) {
    move_focus(nb, true);
}

pub fn focus_prev(nb: &mut NotebookState) {
    move_focus(nb, false);
}

fn move_focus(nb: &mut NotebookState, forward: bool) {
    let targets = nb.targets();
    if targets.is_empty() {
        nb.focus = None;
        return;
    }

    let current = nb
        .focus
        .and_then(|focus| targets.iter().position(|t| *t == focus));
    let next = match (current, forward) {
        (Some(i), true) => (i + 1) % targets.len(),
        (Some(i), false) => (i + targets.len() - 1) % targets.len(),
        (None, true) => 0,
        (None, false) => targets.len() - 1,
    };
    let target = targets[next];
    nb.focus = Some(target);

    if let Some(line) = nb.hits.line_of(target) {
        nb.scroll.reveal_line(line);
    }
}

/// Handles wheel scrolling, hover tracking and clicks.
pub fn handle_mouse(
    nb: &mut NotebookState,
    mouse: MouseEvent,
) -> Result<Vec<UiEffect>, DispatchError> {
    match mouse.kind {
        MouseEventKind::ScrollUp => nb.scroll.scroll_up(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollDown => nb.scroll.scroll_down(MOUSE_SCROLL_LINES),
        MouseEventKind::Moved => {
            nb.hover = nb.hits.target_at(mouse.column, mouse.row);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(target) = nb.hits.target_at(mouse.column, mouse.row) {
                nb.focus = Some(target);
                return activate(nb, target);
            }
        }
        _ => {}
    }
    Ok(vec![])
}
