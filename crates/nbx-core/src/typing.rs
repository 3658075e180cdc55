//! Typing animation: per-cell reveal state and the timer task driving it.
//!
//! A [`TypingScheduler`] owns at most one running schedule. Each schedule is a
//! tokio task that only sleeps and reports [`TypingEvent`]s to a sink; the
//! owner of the [`AnimationState`] applies them. State never lives in the
//! task, so a cancelled schedule can at worst deliver an event tagged with an
//! outdated [`ScheduleId`], which the consumer drops.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::AnimationConfig;

/// Lifecycle of a cell's typing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the initial delay.
    #[default]
    Pending,
    Typing,
    /// Fully revealed, output not shown yet.
    Settling,
    Done,
}

/// Progress notifications sent by a running schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingEvent {
    Started,
    /// Total number of characters now revealed.
    Revealed(usize),
    Done,
}

/// Identifies one call to [`TypingScheduler::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScheduleId(u64);

impl ScheduleId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Delays for one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingTiming {
    pub enabled: bool,
    pub initial_delay: Duration,
    pub per_char: Duration,
    pub settle_delay: Duration,
}

impl Default for TypingTiming {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_millis(200),
            per_char: Duration::from_millis(15),
            settle_delay: Duration::from_millis(300),
        }
    }
}

impl TypingTiming {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            enabled: config.enabled,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            per_char: Duration::from_millis(config.typing_speed_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    /// Timing that reveals everything immediately.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Pushes the start back by `extra` (used to stagger cells).
    #[must_use]
    pub fn delayed_by(mut self, extra: Duration) -> Self {
        self.initial_delay += extra;
        self
    }
}

/// Reveal progress of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    revealed: usize,
    len: usize,
    phase: Phase,
}

impl AnimationState {
    pub fn new(len: usize) -> Self {
        Self {
            revealed: 0,
            len,
            phase: Phase::Pending,
        }
    }

    /// A fully revealed state with output visible.
    pub fn finished(len: usize) -> Self {
        Self {
            revealed: len,
            len,
            phase: Phase::Done,
        }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_output_visible(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn is_typing(&self) -> bool {
        self.phase == Phase::Typing
    }

    /// Applies an event, returning whether the state changed.
    ///
    /// Events that would move the phase backwards, shrink `revealed` or
    /// reveal past the end are ignored.
    pub fn apply(&mut self, event: TypingEvent) -> bool {
        match (self.phase, event) {
            (Phase::Pending, TypingEvent::Started) => {
                self.phase = if self.len == 0 {
                    Phase::Settling
                } else {
                    Phase::Typing
                };
                true
            }
            (Phase::Typing, TypingEvent::Revealed(n)) if n > self.revealed && n <= self.len => {
                self.revealed = n;
                if n == self.len {
                    self.phase = Phase::Settling;
                }
                true
            }
            (Phase::Settling, TypingEvent::Done) => {
                self.phase = Phase::Done;
                true
            }
            _ => false,
        }
    }

    /// Jumps straight to the end.
    pub fn skip(&mut self) -> bool {
        if self.phase == Phase::Done {
            return false;
        }
        *self = Self::finished(self.len);
        true
    }
}

/// Handle for stopping a schedule.
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: ScheduleId,
    token: CancellationToken,
}

impl CancelToken {
    pub fn id(&self) -> ScheduleId {
        self.id
    }

    /// Stops further events. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Runs at most one typing schedule at a time.
#[derive(Debug, Default)]
pub struct TypingScheduler {
    last_id: ScheduleId,
    current: Option<CancelToken>,
}

impl TypingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the most recently started schedule.
    pub fn current_id(&self) -> Option<ScheduleId> {
        self.current.as_ref().map(CancelToken::id)
    }

    /// Starts revealing `len` characters, cancelling any running schedule
    /// first.
    ///
    /// With animation enabled this spawns a task on the current tokio
    /// runtime. With animation disabled every event is delivered before this
    /// returns and no runtime is needed.
    pub fn start<F>(&mut self, len: usize, timing: TypingTiming, sink: F) -> CancelToken
    where
        F: Fn(ScheduleId, TypingEvent) + Send + 'static,
    {
        self.cancel();

        self.last_id = self.last_id.next();
        let handle = CancelToken {
            id: self.last_id,
            token: CancellationToken::new(),
        };
        self.current = Some(handle.clone());

        let id = handle.id;
        if !timing.enabled {
            sink(id, TypingEvent::Started);
            if len > 0 {
                sink(id, TypingEvent::Revealed(len));
            }
            sink(id, TypingEvent::Done);
            return handle;
        }

        let cancel = handle.token.clone();
        tokio::spawn(async move {
            let run = async move {
                tokio::time::sleep(timing.initial_delay).await;
                sink(id, TypingEvent::Started);
                for revealed in 1..=len {
                    tokio::time::sleep(timing.per_char).await;
                    sink(id, TypingEvent::Revealed(revealed));
                }
                tokio::time::sleep(timing.settle_delay).await;
                sink(id, TypingEvent::Done);
            };
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = run => {}
            }
        });

        handle
    }

    /// Cancels the running schedule, if any.
    pub fn cancel(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }
}

impl Drop for TypingScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    type Received = mpsc::UnboundedReceiver<(ScheduleId, TypingEvent)>;

    fn channel_sink() -> (impl Fn(ScheduleId, TypingEvent) + Send + 'static, Received) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            move |id, event| {
                let _ = tx.send((id, event));
            },
            rx,
        )
    }

    fn drain(rx: &mut Received) -> Vec<(ScheduleId, TypingEvent)> {
        let mut out = Vec::new();
        while let Ok(item) = rx.try_recv() {
            out.push(item);
        }
        out
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_state_machine_happy_path() {
        let mut state = AnimationState::new(2);
        assert_eq!(state.phase(), Phase::Pending);

        assert!(state.apply(TypingEvent::Started));
        assert!(state.apply(TypingEvent::Revealed(1)));
        assert_eq!(state.phase(), Phase::Typing);
        assert!(state.apply(TypingEvent::Revealed(2)));
        assert_eq!(state.phase(), Phase::Settling);
        assert!(!state.is_output_visible());
        assert!(state.apply(TypingEvent::Done));
        assert!(state.is_output_visible());
    }

    #[test]
    fn test_reveal_is_monotonic_and_bounded() {
        let mut state = AnimationState::new(5);
        state.apply(TypingEvent::Started);
        state.apply(TypingEvent::Revealed(3));

        assert!(!state.apply(TypingEvent::Revealed(2)));
        assert!(!state.apply(TypingEvent::Revealed(3)));
        assert!(!state.apply(TypingEvent::Revealed(6)));
        assert_eq!(state.revealed(), 3);
    }

    #[test]
    fn test_out_of_order_phases_ignored() {
        let mut state = AnimationState::new(3);
        assert!(!state.apply(TypingEvent::Revealed(1)));
        assert!(!state.apply(TypingEvent::Done));
        state.apply(TypingEvent::Started);
        assert!(!state.apply(TypingEvent::Started));
        assert!(!state.apply(TypingEvent::Done));
    }

    #[test]
    fn test_empty_code_settles_on_start() {
        let mut state = AnimationState::new(0);
        state.apply(TypingEvent::Started);
        assert_eq!(state.phase(), Phase::Settling);
        state.apply(TypingEvent::Done);
        assert!(state.is_output_visible());
    }

    #[test]
    fn test_skip() {
        let mut state = AnimationState::new(4);
        state.apply(TypingEvent::Started);
        assert!(state.skip());
        assert_eq!(state, AnimationState::finished(4));
        assert!(!state.skip());
    }

    #[test]
    fn test_disabled_delivers_synchronously() {
        let (sink, mut rx) = channel_sink();
        let mut scheduler = TypingScheduler::new();

        let token = scheduler.start(7, TypingTiming::disabled(), sink);

        let events: Vec<_> = drain(&mut rx).into_iter().map(|(_, e)| e).collect();
        assert_eq!(
            events,
            vec![
                TypingEvent::Started,
                TypingEvent::Revealed(7),
                TypingEvent::Done
            ]
        );
        assert_eq!(scheduler.current_id(), Some(token.id()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_timing() {
        let (sink, mut rx) = channel_sink();
        let mut scheduler = TypingScheduler::new();
        scheduler.start(3, TypingTiming::default(), sink);

        tokio::time::sleep(ms(195)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(ms(10)).await;
        assert_eq!(drain(&mut rx).len(), 1);

        // 200 + 3 * 15
        tokio::time::sleep(ms(45)).await;
        let reveals: Vec<_> = drain(&mut rx).into_iter().map(|(_, e)| e).collect();
        assert_eq!(
            reveals,
            vec![
                TypingEvent::Revealed(1),
                TypingEvent::Revealed(2),
                TypingEvent::Revealed(3)
            ]
        );

        tokio::time::sleep(ms(290)).await;
        assert!(drain(&mut rx).is_empty());
        tokio::time::sleep(ms(20)).await;
        assert_eq!(
            drain(&mut rx).last().map(|(_, e)| *e),
            Some(TypingEvent::Done)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_only_needs_send() {
        // Cell is Send but not Sync.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let delivered = std::cell::Cell::new(0_usize);
        let sink = move |id: ScheduleId, event: TypingEvent| {
            delivered.set(delivered.get() + 1);
            let _ = tx.send((id, event, delivered.get()));
        };
        let mut scheduler = TypingScheduler::new();
        scheduler.start(2, TypingTiming::default(), sink);

        tokio::time::sleep(ms(1_000)).await;
        let mut counts = Vec::new();
        while let Ok((_, _, count)) = rx.try_recv() {
            counts.push(count);
        }
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_events() {
        let (sink, mut rx) = channel_sink();
        let mut scheduler = TypingScheduler::new();
        let token = scheduler.start(10, TypingTiming::default(), sink);

        tokio::time::sleep(ms(222)).await;
        let before = drain(&mut rx).len();
        token.cancel();
        token.cancel();

        tokio::time::sleep(ms(2_000)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(before >= 1);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous() {
        let (first_sink, mut first_rx) = channel_sink();
        let (second_sink, mut second_rx) = channel_sink();
        let mut scheduler = TypingScheduler::new();

        let first = scheduler.start(4, TypingTiming::default(), first_sink);
        tokio::time::sleep(ms(230)).await;
        drain(&mut first_rx);

        let second = scheduler.start(4, TypingTiming::default(), second_sink);
        assert!(first.is_cancelled());
        assert_ne!(first.id(), second.id());

        tokio::time::sleep(ms(2_000)).await;
        assert!(drain(&mut first_rx).is_empty());

        let events = drain(&mut second_rx);
        assert!(events.iter().all(|(id, _)| *id == second.id()));

        let mut state = AnimationState::new(4);
        for (_, event) in events {
            state.apply(event);
        }
        assert!(state.is_output_visible());
        assert_eq!(state.revealed(), 4);
    }

    #[test]
    fn test_timing_from_config() {
        let config = AnimationConfig {
            enabled: true,
            typing_speed_ms: 5,
            initial_delay_ms: 10,
            settle_delay_ms: 20,
            stagger_ms: 200,
        };
        let timing = TypingTiming::from_config(&config).delayed_by(ms(400));

        assert_eq!(timing.per_char, ms(5));
        assert_eq!(timing.initial_delay, ms(410));
        assert_eq!(timing.settle_delay, ms(20));
    }
}
