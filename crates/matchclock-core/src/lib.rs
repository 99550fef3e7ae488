//! # Matchclock Core Library
//!
//! This library provides the logic behind a live match-day clock. It expands
//! a small schedule (games, quarter lengths, breaks, downtime, warning-bell
//! lead time) into an ordered timeline of segments and runs a countdown over
//! it. The CLI binary is a thin consumer of the state produced here.
//!
//! ## Architecture
//!
//! - **Timeline**: a pure expansion of [`ScheduleConfig`] into [`Segment`]s
//! - **Segment clock**: a tick-driven state machine that requires the caller
//!   to invoke `tick()` once per interval; [`ClockDriver`] paces those ticks
//!   against absolute deadlines
//! - **Signals**: threshold zones near the end of each segment, emitted as
//!   typed [`Event`]s for the audio and presentation layers
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Timeline`]: ordered segments for one configuration
//! - [`SegmentClock`]: core clock state machine
//! - [`ThresholdSignaler`]: warning and hooter zone detection
//! - [`AdjustmentStack`]: undoable manual time corrections
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::{ClockPolicy, Config, ScheduleConfig, ScheduleForm};
pub use timer::{
    AdjustmentStack, ClockDriver, ClockSnapshot, GameProgress, RunState, Segment, SegmentClock,
    SegmentKind, Signal, SignalZone, ThresholdSignaler, TickPacer, Timeline,
};

/// Format seconds as `MM:SS`. Negative values are prefixed with `-`.
pub fn format_time(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}
