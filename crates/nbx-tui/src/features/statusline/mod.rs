//! Status line feature slice.
//!
//! Two rows at the bottom of the screen: the main status line (diagnostics,
//! tooltips, key hints) and an optional debug line with frame rate and
//! animation counters (`--debug-status`).

mod render;
mod state;

pub use render::{render_debug_status_line, render_status_line};
pub use state::{StatusLine, StatusLineAccumulator, StatusMessage};
