mod adjustments;
mod driver;
mod engine;
mod pacer;
mod schedule;
mod threshold;

pub use adjustments::AdjustmentStack;
pub use driver::ClockDriver;
pub use engine::{ClockSnapshot, GameProgress, RunState, SegmentClock, NOT_STARTED};
pub use pacer::TickPacer;
pub use schedule::{Segment, SegmentKind, Timeline, SECONDS_IN_MINUTE};
pub use threshold::{
    Signal, SignalZone, ThresholdSignaler, HOOTER_WINDOW_SECS, PRE_WARNING_WINDOW_SECS,
};
