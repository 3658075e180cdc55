//! Core nbx library (notebook model, typing animation, action dispatch, config).

pub mod cell;
pub mod config;
pub mod dataset;
pub mod dispatch;
pub mod interrupt;
pub mod logging;
pub mod segments;
pub mod session;
pub mod span;
pub mod typing;

pub use cell::{Cell, Output};
pub use dataset::{Dataset, Datasets, Item};
pub use dispatch::{DispatchError, Dispatched, Dispatcher};
pub use segments::{Segment, segments};
pub use session::NotebookSession;
pub use span::{Action, CustomAction, Span, SpanKind};
pub use typing::{
    AnimationState, CancelToken, Phase, ScheduleId, TypingEvent, TypingScheduler, TypingTiming,
};
