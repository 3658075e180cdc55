//! Typing effect handlers.

use std::collections::HashMap;

use nbx_core::{ScheduleId, TypingScheduler, TypingTiming};

use super::inbox::UiEventSender;
use crate::events::UiEvent;

/// One scheduler per cell index.
///
/// Schedulers are kept across resets so their ids keep increasing and events
/// still queued from a cancelled schedule never match a new one.
#[derive(Debug, Default)]
pub struct TypingSchedulers {
    by_cell: HashMap<usize, TypingScheduler>,
}

impl TypingSchedulers {
    /// Starts typing `cell`, forwarding progress to the inbox.
    pub fn start(
        &mut self,
        inbox: &UiEventSender,
        cell: usize,
        len: usize,
        timing: TypingTiming,
    ) -> ScheduleId {
        let tx = inbox.clone();
        self.by_cell
            .entry(cell)
            .or_default()
            .start(len, timing, move |schedule, event| {
                let _ = tx.send(UiEvent::Typing {
                    cell,
                    schedule,
                    event,
                });
            })
            .id()
    }

    pub fn cancel_all(&mut self) {
        for scheduler in self.by_cell.values_mut() {
            scheduler.cancel();
        }
    }

    /// Cells whose latest schedule was not cancelled.
    pub fn active(&self) -> usize {
        self.by_cell
            .values()
            .filter(|scheduler| scheduler.current_id().is_some())
            .count()
    }
}
