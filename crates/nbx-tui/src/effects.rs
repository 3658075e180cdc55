//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They cover task spawning and cancellation only; the reducer never starts
//! a timer itself.

use nbx_core::TypingTiming;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Start (or restart) the typing schedule for a cell.
    ///
    /// The runtime answers with `UiEvent::TypingScheduled` before any typing
    /// event of the new schedule is delivered.
    StartTyping {
        cell: usize,
        len: usize,
        timing: TypingTiming,
    },

    /// Cancel every running typing schedule.
    CancelAllTyping,
}
