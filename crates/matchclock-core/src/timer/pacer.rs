//! Deadline-based tick pacing.
//!
//! Deadlines are computed as `anchor + interval * n` rather than by chaining
//! relative sleeps, so scheduling jitter never accumulates. Pausing keeps the
//! partial interval already elapsed and resuming re-anchors with it, so
//! pause/resume cycles neither gain nor lose time.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TickPacer {
    interval: Duration,
    anchor: Option<Instant>,
    /// Ticks handed out since `anchor`.
    delivered: u64,
    /// Part of an interval that had elapsed when paused.
    carried: Duration,
}

impl TickPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            anchor: None,
            delivered: 0,
            carried: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Begin pacing from `now` with a full interval before the first tick.
    pub fn start(&mut self, now: Instant) {
        self.anchor = Some(now);
        self.delivered = 0;
        self.carried = Duration::ZERO;
    }

    /// Stop pacing, remembering how far into the current interval we were.
    pub fn pause(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            let elapsed = now.saturating_duration_since(anchor);
            let consumed = self.offset(self.delivered).unwrap_or(elapsed);
            self.carried = elapsed.saturating_sub(consumed).min(self.interval);
            self.delivered = 0;
        }
    }

    /// Continue pacing, honouring the partial interval carried over.
    pub fn resume(&mut self, now: Instant) {
        if self.anchor.is_some() {
            return;
        }
        self.anchor = Some(now.checked_sub(self.carried).unwrap_or(now));
        self.delivered = 0;
        self.carried = Duration::ZERO;
    }

    /// Stop pacing and drop any carried phase.
    pub fn stop(&mut self) {
        self.anchor = None;
        self.delivered = 0;
        self.carried = Duration::ZERO;
    }

    /// Number of ticks that fell due up to `now` and were not yet handed out.
    pub fn due(&mut self, now: Instant) -> u64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(anchor);
        let total = (elapsed.as_nanos() / self.interval.as_nanos()) as u64;
        let due = total.saturating_sub(self.delivered);
        self.delivered = self.delivered.max(total);
        due
    }

    /// When the next tick falls due, if pacing.
    pub fn next_deadline(&self) -> Option<Instant> {
        let anchor = self.anchor?;
        anchor.checked_add(self.offset(self.delivered + 1)?)
    }

    fn offset(&self, ticks: u64) -> Option<Duration> {
        self.interval.checked_mul(u32::try_from(ticks).ok()?)
    }
}
