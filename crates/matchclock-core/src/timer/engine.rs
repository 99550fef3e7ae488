//! Segment clock implementation.
//!
//! The clock is a tick-driven state machine over an immutable [`Timeline`].
//! It does not use internal threads - the caller delivers `tick()` once per
//! interval while the clock is running (see [`super::ClockDriver`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running -> Complete
//! (any) -> Idle            via reset()
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = SegmentClock::new(&config);
//! clock.start();
//! // Once per tick interval:
//! for event in clock.tick() { /* render, play pips */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use super::adjustments::AdjustmentStack;
use super::schedule::{Segment, SegmentKind, Timeline};
use super::threshold::{Signal, ThresholdSignaler};
use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::{ClockPolicy, Config, ScheduleConfig};

/// Section name shown while no segment is loaded.
pub const NOT_STARTED: &str = "Not Started";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    /// Ran past the final segment. Only `reset()` leaves this state.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    pub current: u32,
    pub total: u32,
}

/// Read-only view for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub run_state: RunState,
    pub index: usize,
    pub kind: Option<SegmentKind>,
    pub section_name: String,
    pub full_name: Option<String>,
    pub game_number: Option<u32>,
    pub time_left: i64,
    pub duration_secs: i64,
    pub game_progress: GameProgress,
    /// Adjustments that can still be undone.
    pub pending_adjustments: usize,
    /// Sum of the pending adjustments, in seconds.
    pub net_adjustment: i64,
    pub can_adjust: bool,
    pub can_jump: bool,
    pub can_edit_settings: bool,
    /// Signal raised by the most recent tick.
    pub last_signal: Option<Signal>,
}

/// Match-day clock.
///
/// Owns the countdown of the current segment; the timeline itself is never
/// mutated and is only replaced by [`SegmentClock::reconfigure`].
#[derive(Debug, Clone)]
pub struct SegmentClock {
    schedule: ScheduleConfig,
    policy: ClockPolicy,
    timeline: Timeline,
    state: RunState,
    index: usize,
    /// False while the "Not Started" placeholder is shown.
    loaded: bool,
    time_left: i64,
    signaler: ThresholdSignaler,
    adjustments: AdjustmentStack,
    game_progress: GameProgress,
    last_signal: Option<Signal>,
}

impl SegmentClock {
    /// Build the timeline for `config` and create an idle clock over it.
    pub fn new(config: &Config) -> Self {
        let timeline = Timeline::build(&config.schedule);
        Self::with_timeline(config.schedule.clone(), config.clock.clone(), timeline)
    }

    pub fn with_timeline(schedule: ScheduleConfig, policy: ClockPolicy, timeline: Timeline) -> Self {
        let total = schedule.num_games;
        Self {
            schedule,
            policy,
            timeline,
            state: RunState::Idle,
            index: 0,
            loaded: false,
            time_left: 0,
            signaler: ThresholdSignaler::new(),
            adjustments: AdjustmentStack::new(),
            game_progress: GameProgress { current: 1, total },
            last_signal: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn time_left(&self) -> i64 {
        self.time_left
    }

    /// The loaded segment, or `None` while the placeholder is shown.
    pub fn current_segment(&self) -> Option<&Segment> {
        if self.loaded {
            self.timeline.get(self.index)
        } else {
            None
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn full_names(&self) -> Vec<&str> {
        self.timeline.full_names()
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    pub fn policy(&self) -> &ClockPolicy {
        &self.policy
    }

    pub fn adjustments(&self) -> &AdjustmentStack {
        &self.adjustments
    }

    pub fn game_progress(&self) -> GameProgress {
        self.game_progress
    }

    pub fn last_signal(&self) -> Option<&Signal> {
        self.last_signal.as_ref()
    }

    pub fn tick_interval(&self) -> Duration {
        self.schedule.tick_interval()
    }

    pub fn can_adjust(&self) -> bool {
        self.state == RunState::Running
            && !(self.policy.lock_gametime_adjustments
                && self.current_segment().map(|s| s.kind) == Some(SegmentKind::Gametime))
    }

    pub fn can_jump(&self) -> bool {
        matches!(self.state, RunState::Idle | RunState::Paused)
    }

    /// Settings may be edited unless the clock is counting down.
    pub fn can_edit_settings(&self) -> bool {
        self.state != RunState::Running
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        let segment = self.current_segment();
        ClockSnapshot {
            run_state: self.state,
            index: self.index,
            kind: segment.map(|s| s.kind),
            section_name: segment
                .map(|s| s.section_name.clone())
                .unwrap_or_else(|| NOT_STARTED.to_string()),
            full_name: segment.map(|s| s.full_name.clone()),
            game_number: segment.and_then(|s| s.game_number),
            time_left: self.time_left,
            duration_secs: segment.map(|s| s.duration_secs).unwrap_or(0),
            game_progress: self.game_progress,
            pending_adjustments: self.adjustments.len(),
            net_adjustment: self.adjustments.net(),
            can_adjust: self.can_adjust(),
            can_jump: self.can_jump(),
            can_edit_settings: self.can_edit_settings(),
            last_signal: self.last_signal.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the day from the selected segment (index 0 unless jumped).
    ///
    /// Returns `Event::Rejected` without changing state when the schedule is
    /// incomplete, and `None` when the clock is not idle.
    pub fn start(&mut self) -> Option<Event> {
        if self.state != RunState::Idle {
            return None;
        }
        if let Err(err) = self.check_startable() {
            warn!("start rejected: {err}");
            return Some(Event::Rejected {
                reason: err.to_string(),
                at: Utc::now(),
            });
        }

        self.game_progress = GameProgress {
            current: 1,
            total: self.schedule.num_games,
        };
        if !self.loaded {
            self.load(self.index);
        }
        self.game_progress.current = self.current_segment().map(|s| s.progress_game())?;
        self.state = RunState::Running;

        let segment = self.current_segment()?;
        info!(segment = %segment.full_name, "clock started");
        Some(Event::ClockStarted {
            index: self.index,
            full_name: segment.full_name.clone(),
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != RunState::Running {
            return None;
        }
        self.state = RunState::Paused;
        info!(time_left = self.time_left, "clock paused");
        Some(Event::ClockPaused {
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != RunState::Paused {
            return None;
        }
        self.state = RunState::Running;
        info!(time_left = self.time_left, "clock resumed");
        Some(Event::ClockResumed {
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    /// Back to idle at index 0 with the placeholder shown. Valid from any state.
    pub fn reset(&mut self) -> Event {
        self.state = RunState::Idle;
        self.index = 0;
        self.loaded = false;
        self.time_left = 0;
        self.adjustments.clear();
        self.signaler.rearm();
        self.last_signal = None;
        self.game_progress = GameProgress {
            current: 1,
            total: self.schedule.num_games,
        };
        info!("clock reset");
        Event::ClockReset { at: Utc::now() }
    }

    /// Apply a new configuration: rebuild the timeline and reset.
    pub fn reconfigure(&mut self, config: &Config) -> Event {
        self.schedule = config.schedule.clone();
        self.policy = config.clock.clone();
        self.timeline = Timeline::build(&self.schedule);
        debug!(segments = self.timeline.len(), "timeline rebuilt");
        self.reset()
    }

    /// Select a segment by full name. Only while idle or paused.
    ///
    /// Unknown names are ignored. The selected segment starts from its full
    /// duration.
    pub fn jump_to(&mut self, full_name: &str) -> Option<Event> {
        if !self.can_jump() {
            return None;
        }
        let index = self.timeline.position(full_name)?;
        self.load(index);
        info!(segment = full_name, "jumped to segment");
        Some(Event::SegmentJumped {
            index,
            full_name: full_name.to_string(),
            at: Utc::now(),
        })
    }

    /// Deliver one tick. Does nothing unless running.
    ///
    /// Returns the signal raised for the current segment, if any, followed by
    /// `SegmentAdvanced` or `TimelineCompleted` when the segment ran out.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != RunState::Running {
            return events;
        }
        let Some(segment) = self.timeline.get(self.index) else {
            return events;
        };

        self.time_left -= 1;
        trace!(segment = %segment.full_name, time_left = self.time_left, "tick");

        let signal = self.signaler.evaluate(segment, self.time_left);
        if let Some(signal) = &signal {
            events.push(Event::Signal {
                full_name: segment.full_name.clone(),
                signal: signal.clone(),
                at: Utc::now(),
            });
        }

        if self.time_left <= 0 {
            events.push(self.advance());
        }
        self.last_signal = signal;
        events
    }

    /// Add (or with a negative delta, remove) time from the current segment.
    ///
    /// Only while running. With clamping on, the result stays within
    /// `[0, duration]` and only the delta actually applied is recorded.
    pub fn add_seconds(&mut self, delta: i64) -> Option<Event> {
        if self.state != RunState::Running {
            return None;
        }
        let segment = self.timeline.get(self.index)?;
        if self.policy.lock_gametime_adjustments && segment.kind == SegmentKind::Gametime {
            warn!(segment = %segment.full_name, "adjustment rejected during play");
            return Some(Event::Rejected {
                reason: format!("Time cannot be adjusted during {}", segment.full_name),
                at: Utc::now(),
            });
        }

        let mut target = self.time_left.saturating_add(delta);
        if self.policy.clamp_adjustments {
            target = target.clamp(0, segment.duration_secs.max(0));
        }
        let applied = target - self.time_left;
        self.adjustments.push(applied);
        self.time_left = target;
        debug!(requested = delta, applied, time_left = self.time_left, "time adjusted");

        Some(Event::TimeAdjusted {
            delta: applied,
            time_left: self.time_left,
            pending: self.adjustments.len(),
            at: Utc::now(),
        })
    }

    /// Revert the most recent adjustment to the current segment.
    ///
    /// No-op when there is none or the clock is neither running nor paused.
    /// Exact unless ticks since the adjustment would push the countdown out
    /// of `[0, duration]` while clamping is on.
    pub fn undo_last_adjustment(&mut self) -> Option<Event> {
        if !matches!(self.state, RunState::Running | RunState::Paused) {
            return None;
        }
        let duration = self.current_segment()?.duration_secs;
        let delta = self.adjustments.pop()?;
        self.time_left -= delta;
        if self.policy.clamp_adjustments {
            self.time_left = self.time_left.clamp(0, duration.max(0));
        }
        debug!(delta, time_left = self.time_left, "adjustment undone");
        Some(Event::AdjustmentUndone {
            delta,
            time_left: self.time_left,
            pending: self.adjustments.len(),
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn check_startable(&self) -> Result<(), ValidationError> {
        self.schedule.validate()?;
        if self.timeline.is_empty() {
            return Err(ValidationError::EmptyTimeline);
        }
        Ok(())
    }

    /// Make `index` the current segment with a fresh countdown.
    fn load(&mut self, index: usize) {
        self.index = index;
        self.loaded = true;
        self.time_left = self.timeline.get(index).map(|s| s.duration_secs).unwrap_or(0);
        self.adjustments.clear();
        self.signaler.rearm();
        self.last_signal = None;
        if let Some(segment) = self.timeline.get(index) {
            self.game_progress.current = segment.progress_game();
            debug!(index, segment = %segment.full_name, "segment loaded");
        }
    }

    fn advance(&mut self) -> Event {
        let next = self.index + 1;
        match self.timeline.get(next) {
            Some(segment) => {
                let event = Event::SegmentAdvanced {
                    index: next,
                    kind: segment.kind,
                    full_name: segment.full_name.clone(),
                    duration_secs: segment.duration_secs,
                    at: Utc::now(),
                };
                self.load(next);
                event
            }
            None => {
                self.state = RunState::Complete;
                self.time_left = 0;
                self.adjustments.clear();
                info!("timeline complete");
                Event::TimelineCompleted { at: Utc::now() }
            }
        }
    }
}
