use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SegmentKind, Signal};

/// Every state change of the clock produces an Event.
/// The presentation layer renders them; the audio layer reacts to signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ClockStarted {
        index: usize,
        full_name: String,
        time_left: i64,
        at: DateTime<Utc>,
    },
    ClockPaused {
        time_left: i64,
        at: DateTime<Utc>,
    },
    ClockResumed {
        time_left: i64,
        at: DateTime<Utc>,
    },
    ClockReset {
        at: DateTime<Utc>,
    },
    SegmentJumped {
        index: usize,
        full_name: String,
        at: DateTime<Utc>,
    },
    SegmentAdvanced {
        index: usize,
        kind: SegmentKind,
        full_name: String,
        duration_secs: i64,
        at: DateTime<Utc>,
    },
    /// Ran past the final segment.
    TimelineCompleted {
        at: DateTime<Utc>,
    },
    TimeAdjusted {
        /// Delta actually applied, after clamping.
        delta: i64,
        time_left: i64,
        pending: usize,
        at: DateTime<Utc>,
    },
    AdjustmentUndone {
        delta: i64,
        time_left: i64,
        pending: usize,
        at: DateTime<Utc>,
    },
    /// Threshold signal for the current segment.
    Signal {
        full_name: String,
        signal: Signal,
        at: DateTime<Utc>,
    },
    /// An operator action was refused; state is unchanged.
    Rejected {
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Signal carried by this event, if any.
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Event::Signal { signal, .. } => Some(signal),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::Rejected { .. })
    }
}
