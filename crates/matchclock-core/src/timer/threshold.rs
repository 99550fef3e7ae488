//! Threshold signaling near the end of a segment.
//!
//! ## Zones
//!
//! In descending order of remaining time, with `T` the segment's warn
//! threshold in seconds:
//!
//! - **Pre-warning** (`T < t <= T + 5`): a pip on every tick
//! - **Warning** (`5 < t <= T`): one signal on entry
//! - **Hooter** (`0 < t <= 5`): a pip on every tick
//! - **Ended** (`t <= 0`): one signal on entry
//!
//! When windows overlap (a threshold of five seconds or less) the lower
//! zone wins. The signaler only classifies; audio and banners belong to
//! whoever consumes the [`Signal`]s.

use serde::{Deserialize, Serialize};

use super::schedule::Segment;

/// Width of the pip window above the warn threshold.
pub const PRE_WARNING_WINDOW_SECS: i64 = 5;
/// Width of the final countdown window before the hooter.
pub const HOOTER_WINDOW_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalZone {
    /// Nothing to signal yet.
    Clear,
    PreWarning,
    Warning,
    Hooter,
    Ended,
}

impl SignalZone {
    /// Classify remaining time against a warn threshold.
    pub fn classify(time_left: i64, threshold_secs: f64) -> Self {
        let t = time_left as f64;
        if time_left <= 0 {
            SignalZone::Ended
        } else if time_left <= HOOTER_WINDOW_SECS {
            SignalZone::Hooter
        } else if t <= threshold_secs {
            SignalZone::Warning
        } else if t <= threshold_secs + PRE_WARNING_WINDOW_SECS as f64 {
            SignalZone::PreWarning
        } else {
            SignalZone::Clear
        }
    }
}

/// Abstract signal for the presentation and audio layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    PreWarningPip { time_left: i64 },
    WarningEntered { message: String, time_left: i64 },
    HooterPip { time_left: i64 },
    Ended { message: String },
}

/// Zone classifier with a per-segment entry marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdSignaler {
    /// Last once-on-entry zone that fired for the current segment.
    marker: Option<SignalZone>,
}

impl ThresholdSignaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget fired zones. Called whenever a segment is loaded.
    pub fn rearm(&mut self) {
        self.marker = None;
    }

    /// Evaluate the segment's remaining time and return the signal due, if any.
    pub fn evaluate(&mut self, segment: &Segment, time_left: i64) -> Option<Signal> {
        match SignalZone::classify(time_left, segment.warn_threshold_secs) {
            SignalZone::Clear => {
                self.marker = None;
                None
            }
            SignalZone::PreWarning => {
                // Back above the threshold: the warning may fire again.
                self.marker = None;
                Some(Signal::PreWarningPip { time_left })
            }
            SignalZone::Warning => {
                if self.marker == Some(SignalZone::Warning) {
                    return None;
                }
                self.marker = Some(SignalZone::Warning);
                Some(Signal::WarningEntered {
                    message: segment.warn_message.clone(),
                    time_left,
                })
            }
            SignalZone::Hooter => Some(Signal::HooterPip { time_left }),
            SignalZone::Ended => {
                if self.marker == Some(SignalZone::Ended) {
                    return None;
                }
                self.marker = Some(SignalZone::Ended);
                Some(Signal::Ended {
                    message: segment.end_message.clone(),
                })
            }
        }
    }
}
