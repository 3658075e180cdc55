//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the Elm runtime boundary. The reducer stays pure and produces
//! effects; this module executes them.
//!
//! Typing schedulers run as tokio tasks and post their progress to the inbox,
//! which is drained once per loop iteration. The runtime must therefore be
//! driven from inside a tokio runtime when animation is enabled.

mod handlers;
mod inbox;

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use handlers::TypingSchedulers;
use inbox::{UiEventReceiver, UiEventSender};
use nbx_core::{Datasets, interrupt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, NotebookOptions};
use crate::{render, terminal, update};

/// Frame cadence while something animates (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen notebook runtime.
///
/// Terminal state is restored on drop, panic, or a second Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    schedulers: TypingSchedulers,
    last_tick: Instant,
    last_render: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    pub fn new(datasets: Datasets, options: &NotebookOptions) -> Result<Self> {
        // Panic hook before entering the alternate screen.
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let state = AppState::new(datasets, options);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            inbox_tx,
            inbox_rx,
            schedulers: TypingSchedulers::default(),
            last_tick: now,
            last_render: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let effects = update::startup_effects(&self.state);
        self.execute_effects(effects);
        let result = self.event_loop();

        self.schedulers.cancel_all();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            if interrupt::is_interrupted() {
                tracing::debug!("interrupted, leaving notebook");
                self.state.should_quit = true;
                break;
            }

            let mut events = self.collect_events()?;

            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Only Tick renders, which caps the frame rate at the tick cadence.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                let frame_ms =
                    u16::try_from(self.last_render.elapsed().as_millis()).unwrap_or(u16::MAX);
                self.last_render = Instant::now();

                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;

                self.state.status_line.on_frame(frame_ms);
            }
        }

        Ok(())
    }

    /// Collects inbox and terminal events, then a Tick if one is due.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.notebook.is_animating() || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick only when nothing is pending.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::StartTyping { cell, len, timing } => {
                let schedule = self.schedulers.start(&self.inbox_tx, cell, len, timing);
                tracing::trace!(cell, len, ?schedule, "typing scheduled");
                // Reaches the reducer before any event of this schedule,
                // which only arrive through the inbox.
                self.dispatch_event(UiEvent::TypingScheduled { cell, schedule });
            }
            UiEffect::CancelAllTyping => {
                tracing::debug!(active = self.schedulers.active(), "cancelling typing");
                self.schedulers.cancel_all();
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
