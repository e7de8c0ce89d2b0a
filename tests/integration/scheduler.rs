//! Scheduler integration tests
//!
//! Tests the logical clock and event dispatch across process cycles.

use approx::assert_relative_eq;
use motet::prelude::*;
use proptest::prelude::*;

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::tolerances::*;
use helpers::*;

#[test]
fn test_event_inside_cycle_fires() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.05, 0, &fired);

    engine.start().process(Some(0.0));
    assert_eq!(*fired.lock(), vec![(0, 0.05)]);
    assert!(engine.current_time() >= 0.05);
    assert_eq!(engine.pending_events(), 0);
}

#[test]
fn test_event_past_boundary_waits() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.15, 0, &fired);
    engine.start();

    engine.process(Some(0.0));
    assert!(fired.lock().is_empty());
    assert_relative_eq!(engine.current_time(), 0.0);

    engine.process(Some(TEST_INCREMENT));
    assert_eq!(*fired.lock(), vec![(0, 0.15)]);
    assert_relative_eq!(engine.current_time(), 0.15, epsilon = FLOAT_EPSILON);
}

#[test]
fn test_event_on_boundary_fires() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, TEST_INCREMENT, 0, &fired);

    engine.start().process(Some(0.0));
    assert_eq!(fired.lock().len(), 1);
}

#[test]
fn test_late_event_fires_with_its_own_time() {
    let engine = test_engine();
    engine.start().process(Some(1.0));

    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.5, 0, &fired);
    engine.process(Some(1.1));

    assert_eq!(*fired.lock(), vec![(0, 0.5)]);
    assert_relative_eq!(engine.current_time(), 1.1);
}

#[test]
fn test_clock_never_moves_backward() {
    init_tracing();
    let engine = test_engine();
    engine.start().process(Some(2.0));
    engine.process(Some(1.0));
    assert_relative_eq!(engine.current_time(), 2.0);

    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 2.05, 0, &fired);
    engine.process(Some(f64::NAN));
    assert!(engine.current_time() >= 2.0);
}

#[test]
fn test_unsched_removes_exactly_one() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.05, 0, &fired);
    let log = fired.clone();
    let id = engine.sched(0.05, move |_, t| log.lock().push((1, t)));
    sched_recording(&engine, 0.05, 2, &fired);

    assert_eq!(engine.unsched(id), id);
    assert_eq!(engine.pending_events(), 2);
    engine.unsched(id);
    assert_eq!(engine.pending_events(), 2);

    engine.start().process(Some(0.0));
    assert_eq!(*fired.lock(), vec![(0, 0.05), (2, 0.05)]);
}

#[test]
fn test_unsched_none_is_noop() {
    let engine = test_engine();
    engine.sched(1.0, |_, _| {});
    assert!(engine.unsched(EventId::NONE).is_none());
    assert_eq!(engine.pending_events(), 1);
}

#[test]
fn test_next_tick_runs_before_due_events() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.0, 1, &fired);
    let log = fired.clone();
    engine.next_tick(move |_, t| log.lock().push((0, t)));

    engine.start().process(Some(0.3));
    assert_eq!(*fired.lock(), vec![(0, 0.3), (1, 0.0)]);
}

#[test]
fn test_callback_schedules_into_same_cycle() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    let log = fired.clone();
    engine.sched(0.02, move |ctx, t| {
        log.lock().push((0, t));
        let log1 = log.clone();
        ctx.sched(t + 0.02, move |_, t| log1.lock().push((1, t)));
        let log2 = log.clone();
        ctx.sched(t + 1.0, move |_, t| log2.lock().push((2, t)));
    });

    engine.start().process(Some(0.0));
    let fired = fired.lock();
    assert_eq!(fired.len(), 2);
    assert_relative_eq!(fired[1].1, 0.04, epsilon = FLOAT_EPSILON);
    assert_eq!(engine.pending_events(), 1);
}

#[test]
fn test_non_finite_time_schedules_at_zero() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, f64::INFINITY, 0, &fired);
    engine.start().process(Some(0.0));
    assert_eq!(*fired.lock(), vec![(0, 0.0)]);
}

#[test]
fn test_time_notation() {
    let engine = test_engine();
    engine.start().process(Some(1.0));

    let seconds = |value: &str| engine.context(|ctx| ctx.to_seconds(&TimeValue::parse(value)));
    assert_relative_eq!(seconds("4n"), 0.5);
    assert_relative_eq!(seconds("100ms"), 0.1);
    assert_relative_eq!(seconds("+0.5"), 1.5);
    assert_relative_eq!(seconds("garbage"), 0.0);

    engine.set_bpm(60.0);
    assert_relative_eq!(seconds("4n"), 1.0);
}

#[test]
fn test_interval_ticks_across_cycles() {
    let engine = test_engine();
    let ticks = log::<f64>();
    let log = ticks.clone();
    let interval = Interval::new(0.25, move |_, tick| log.lock().push(tick.playback_time));
    engine.context(|ctx| interval.start(ctx, 0.0));
    engine.start();

    for cycle in 0..10 {
        engine.process(Some(cycle as f64 * TEST_INCREMENT));
    }
    assert_eq!(ticks.lock().len(), 4);
    assert_relative_eq!(ticks.lock()[3], 1.0);

    engine.context(|ctx| interval.stop(ctx));
    assert_eq!(engine.pending_events(), 0);
}

proptest! {
    #[test]
    fn test_dispatch_is_stable_sorted(slots in prop::collection::vec(0u8..10, 1..40)) {
        let engine = offline_engine(1.0);
        let fired = log::<(usize, f64)>();
        for (label, slot) in slots.iter().enumerate() {
            sched_recording(&engine, *slot as f64 / 10.0, label, &fired);
        }
        engine.start();

        let fired = fired.lock();
        prop_assert_eq!(fired.len(), slots.len());
        for pair in fired.windows(2) {
            let ((a, ta), (b, tb)) = (pair[0], pair[1]);
            prop_assert!(ta <= tb);
            if ta == tb {
                prop_assert!(a < b, "equal times must keep insertion order");
            }
        }
    }
}
