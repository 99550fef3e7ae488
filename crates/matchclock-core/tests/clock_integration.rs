//! Integration tests for the segment clock.
//!
//! Drives a clock through whole days and checks signals, adjustments and
//! terminal behaviour the way an operator would exercise them.

use matchclock_core::{
    ClockPolicy, Config, Event, RunState, ScheduleConfig, SegmentClock, SegmentKind, Signal,
};
use proptest::prelude::*;

fn config(num_games: u32, play_times: &[u32], break_times: &[u32]) -> Config {
    Config {
        schedule: ScheduleConfig {
            num_games,
            play_times: play_times.to_vec(),
            break_times: break_times.to_vec(),
            down_time: 2,
            warn_bell_time: 0.5,
            ..ScheduleConfig::default()
        },
        clock: ClockPolicy::default(),
    }
}

fn signals(events: &[Event]) -> Vec<Signal> {
    events.iter().filter_map(Event::signal).cloned().collect()
}

fn tick_until(clock: &mut SegmentClock, time_left: i64) -> Vec<Event> {
    let mut events = Vec::new();
    while clock.time_left() > time_left {
        events.extend(clock.tick());
    }
    events
}

#[test]
fn test_full_day_runs_to_completion() {
    let mut clock = SegmentClock::new(&config(2, &[1, 1], &[1]));
    clock.start();

    let mut visited = vec![clock.current_segment().unwrap().full_name.clone()];
    let mut guard = 0;
    while clock.state() == RunState::Running {
        for event in clock.tick() {
            if let Event::SegmentAdvanced { full_name, .. } = event {
                visited.push(full_name);
            }
        }
        guard += 1;
        assert!(guard < 10_000, "clock never completed");
    }

    assert_eq!(clock.state(), RunState::Complete);
    assert_eq!(visited, clock.full_names());
    // Every segment runs for exactly its duration.
    assert_eq!(guard as i64, clock.timeline().total_duration_secs());
}

#[test]
fn test_signal_sequence_for_thirty_second_threshold() {
    let mut clock = SegmentClock::new(&config(1, &[1], &[]));
    clock.start();

    // 60 -> 36: nothing yet.
    assert!(signals(&tick_until(&mut clock, 36)).is_empty());

    // 35..31: one pip per tick.
    let pre = signals(&tick_until(&mut clock, 31));
    assert_eq!(pre.len(), 5);
    assert!(pre.iter().all(|s| matches!(s, Signal::PreWarningPip { .. })));

    // 30..6: exactly one warning, on entry.
    let warn = signals(&tick_until(&mut clock, 6));
    assert_eq!(
        warn,
        vec![Signal::WarningEntered {
            message: "🔔 Game ending soon!!!".into(),
            time_left: 30,
        }]
    );

    // 5..1: hooter pips.
    let hooter = signals(&tick_until(&mut clock, 1));
    assert_eq!(hooter.len(), 5);
    assert!(hooter.iter().all(|s| matches!(s, Signal::HooterPip { .. })));

    // 0: ended once, then complete.
    let end = clock.tick();
    assert_eq!(
        signals(&end),
        vec![Signal::Ended {
            message: "Game over".into()
        }]
    );
    assert_eq!(clock.state(), RunState::Complete);
}

#[test]
fn test_adjustment_above_threshold_rearms_warning() {
    let mut cfg = config(1, &[1], &[2]);
    cfg.clock.lock_gametime_adjustments = false;
    let mut clock = SegmentClock::new(&cfg);
    clock.start();

    let first = signals(&tick_until(&mut clock, 20));
    assert_eq!(
        first
            .iter()
            .filter(|s| matches!(s, Signal::WarningEntered { .. }))
            .count(),
        1
    );

    clock.add_seconds(30);
    assert_eq!(clock.time_left(), 50);
    let second = signals(&tick_until(&mut clock, 20));
    assert_eq!(
        second
            .iter()
            .filter(|s| matches!(s, Signal::WarningEntered { .. }))
            .count(),
        1
    );
}

#[test]
fn test_gametime_lock_and_break_adjustments() {
    let mut clock = SegmentClock::new(&config(1, &[1], &[2]));
    clock.start();
    assert!(clock.add_seconds(-30).unwrap().is_rejection());

    for _ in 0..60 {
        clock.tick();
    }
    assert_eq!(clock.current_segment().unwrap().kind, SegmentKind::Breaktime);
    match clock.add_seconds(-30) {
        Some(Event::TimeAdjusted { delta, time_left, pending, .. }) => {
            assert_eq!(delta, -30);
            assert_eq!(time_left, 90);
            assert_eq!(pending, 1);
        }
        other => panic!("Expected TimeAdjusted, got {other:?}"),
    }
    assert_eq!(clock.snapshot().net_adjustment, -30);
}

#[test]
fn test_jump_then_start_from_selected_segment() {
    let mut clock = SegmentClock::new(&config(2, &[1, 1], &[1]));
    clock.jump_to("Downtime 1");
    match clock.start() {
        Some(Event::ClockStarted { index, full_name, time_left, .. }) => {
            assert_eq!(index, 3);
            assert_eq!(full_name, "Downtime 1");
            assert_eq!(time_left, 120);
        }
        other => panic!("Expected ClockStarted, got {other:?}"),
    }
    let snap = clock.snapshot();
    assert_eq!(snap.kind, Some(SegmentKind::Downtime));
    assert_eq!(snap.game_progress.total, 2);
}

#[test]
fn test_snapshot_serializes_for_presentation() {
    let mut clock = SegmentClock::new(&config(1, &[1], &[]));
    clock.start();
    clock.tick();
    let json = serde_json::to_value(clock.snapshot()).unwrap();
    assert_eq!(json["run_state"], "running");
    assert_eq!(json["section_name"], "Q 1");
    assert_eq!(json["time_left"], 59);
    assert_eq!(json["kind"], "gametime");
}

#[test]
fn test_events_serialize_with_type_tag() {
    let mut clock = SegmentClock::new(&config(1, &[1], &[]));
    let event = clock.start().unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "ClockStarted");
    assert_eq!(json["full_name"], "Game 1 Q 1");
}

proptest! {
    #[test]
    fn prop_undo_restores_exact_values(
        deltas in prop::collection::vec(-200i64..200, 1..20),
        clamp in any::<bool>(),
        warm_up in 0usize..50,
    ) {
        let mut cfg = config(1, &[1], &[2]);
        cfg.clock = ClockPolicy {
            lock_gametime_adjustments: false,
            clamp_adjustments: clamp,
        };
        let mut clock = SegmentClock::new(&cfg);
        clock.start();
        for _ in 0..warm_up {
            clock.tick();
        }

        let mut history = Vec::new();
        for delta in &deltas {
            history.push(clock.time_left());
            prop_assert!(clock.add_seconds(*delta).is_some());
        }
        while let Some(expected) = history.pop() {
            prop_assert!(clock.undo_last_adjustment().is_some());
            prop_assert_eq!(clock.time_left(), expected);
        }
        prop_assert!(clock.undo_last_adjustment().is_none());
    }

    #[test]
    fn prop_each_tick_decrements_by_one(n in 1usize..59) {
        let mut clock = SegmentClock::new(&config(1, &[1], &[]));
        clock.start();
        for i in 1..=n {
            clock.tick();
            prop_assert_eq!(clock.time_left(), 60 - i as i64);
        }
    }
}
