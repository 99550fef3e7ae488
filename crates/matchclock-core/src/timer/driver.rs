//! Couples a [`SegmentClock`] to a [`TickPacer`].
//!
//! Every timer-affecting command suspends or re-establishes the tick source
//! around the state change, so at most one mutation is ever in flight. The
//! caller supplies `now`; the driver never reads the clock itself.

use std::time::Instant;

use super::engine::{RunState, SegmentClock};
use super::pacer::TickPacer;
use crate::events::Event;
use crate::storage::Config;

#[derive(Debug, Clone)]
pub struct ClockDriver {
    clock: SegmentClock,
    pacer: TickPacer,
}

impl ClockDriver {
    pub fn new(clock: SegmentClock) -> Self {
        let pacer = TickPacer::new(clock.tick_interval());
        Self { clock, pacer }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SegmentClock::new(config))
    }

    pub fn clock(&self) -> &SegmentClock {
        &self.clock
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pacer.next_deadline()
    }

    /// Deliver every tick that fell due up to `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..self.pacer.due(now) {
            events.extend(self.clock.tick());
            if self.clock.state() != RunState::Running {
                self.pacer.stop();
                break;
            }
        }
        events
    }

    pub fn start(&mut self, now: Instant) -> Option<Event> {
        let event = self.clock.start()?;
        if self.clock.state() == RunState::Running {
            self.pacer.start(now);
        }
        Some(event)
    }

    /// Flushes ticks already due, then pauses.
    pub fn pause(&mut self, now: Instant) -> Vec<Event> {
        if self.clock.state() != RunState::Running {
            return Vec::new();
        }
        let mut events = self.poll(now);
        self.pacer.pause(now);
        events.extend(self.clock.pause());
        events
    }

    pub fn resume(&mut self, now: Instant) -> Option<Event> {
        let event = self.clock.resume()?;
        self.pacer.resume(now);
        Some(event)
    }

    /// Start, pause or resume depending on the current state.
    pub fn toggle(&mut self, now: Instant) -> Vec<Event> {
        match self.clock.state() {
            RunState::Idle => self.start(now).into_iter().collect(),
            RunState::Running => self.pause(now),
            RunState::Paused => self.resume(now).into_iter().collect(),
            RunState::Complete => Vec::new(),
        }
    }

    pub fn reset(&mut self) -> Event {
        self.pacer.stop();
        self.clock.reset()
    }

    pub fn reconfigure(&mut self, config: &Config) -> Event {
        self.pacer = TickPacer::new(config.schedule.tick_interval());
        self.clock.reconfigure(config)
    }

    pub fn jump_to(&mut self, full_name: &str) -> Option<Event> {
        self.clock.jump_to(full_name)
    }

    pub fn add_seconds(&mut self, delta: i64) -> Option<Event> {
        self.clock.add_seconds(delta)
    }

    pub fn undo_last_adjustment(&mut self) -> Option<Event> {
        self.clock.undo_last_adjustment()
    }
}
