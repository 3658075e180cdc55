//! Notebook feature slice.
//!
//! The scrolling list of `In [n]` / `Out [n]` cells: view state, reducer
//! helpers and rendering.

mod render;
mod state;
pub mod style;
mod update;

pub use render::{NOTEBOOK_MARGIN, PlacedTarget, RenderedNotebook, build_lines, render_notebook};
pub use state::{
    CellAnimation, Hit, HitMap, MOUSE_SCROLL_LINES, NotebookState, ScrollMode, ScrollState,
    TargetRef, TargetSlot,
};
pub use update::{
    activate, activate_focused, focus_next, focus_prev, handle_mouse, handle_scheduled,
    handle_typing, reset, skip_all, start_all,
};
