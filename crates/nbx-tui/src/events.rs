//! UI event types.
//!
//! Everything the reducer reacts to: terminal input, the frame/tick cadence
//! produced by the runtime loop, and typing progress posted to the inbox by
//! scheduler tasks.

use crossterm::event::Event;
use nbx_core::{ScheduleId, TypingEvent};

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Render cadence tick.
    Tick,
    /// Prepended to every loop iteration with the current terminal size.
    Frame { width: u16, height: u16 },
    /// Raw crossterm input.
    Terminal(Event),
    /// A schedule was started for `cell`; older schedules are now stale.
    TypingScheduled { cell: usize, schedule: ScheduleId },
    /// Progress from a typing schedule.
    Typing {
        cell: usize,
        schedule: ScheduleId,
        event: TypingEvent,
    },
}
