//! Shared helpers for the TUI feature slices.

pub mod text;
