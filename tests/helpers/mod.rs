//! Test helpers and fixtures for motet integration tests
//!
//! Engines built here never touch a host clock: time only moves when a test
//! passes a playback time to `process` or advances the returned
//! [`ManualClock`].
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-9): exact arithmetic on times and values
//! - `SAMPLE_EPSILON`: one sample at the test rate

#![allow(dead_code)]

pub mod tolerances;

use motet::core::AutomationEvent;
use motet::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 44100.0;

/// Frames per cycle giving a 0.1s increment at the test rate
pub const TEST_BUFFER_SIZE: usize = 4410;

/// Seconds covered by one live dispatch cycle
pub const TEST_INCREMENT: f64 = TEST_BUFFER_SIZE as f64 / TEST_SAMPLE_RATE;

/// Create a live test engine driven by a manual clock at 0.
pub fn test_engine() -> MotetEngine {
    test_engine_with_clock().0
}

/// Create a live test engine and keep a handle on its host clock.
pub fn test_engine_with_clock() -> (MotetEngine, ManualClock) {
    let clock = ManualClock::new(0.0);
    let engine = MotetEngine::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .buffer_size(TEST_BUFFER_SIZE)
        .clock(clock.clone())
        .build()
        .expect("Failed to create test engine");
    (engine, clock)
}

/// Create an engine that renders `duration` seconds when started.
pub fn offline_engine(duration: f64) -> MotetEngine {
    MotetEngine::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .offline(duration)
        .clock(ManualClock::new(0.0))
        .build()
        .expect("Failed to create offline engine")
}

/// Shared log that callbacks push into.
pub type Log<T> = Arc<Mutex<Vec<T>>>;

pub fn log<T>() -> Log<T> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Schedule a callback at `time` that records `(label, playback_time)`.
pub fn sched_recording(engine: &MotetEngine, time: f64, label: usize, log: &Log<(usize, f64)>) {
    let log = log.clone();
    engine.sched(time, move |_, t| log.lock().push((label, t)));
}

/// The automation timeline of a param's control.
pub fn param_events(engine: &MotetEngine, param: &Param) -> Vec<AutomationEvent> {
    engine.context(|ctx| {
        ctx.graph()
            .control(param.control())
            .map(|control| control.events().to_vec())
            .unwrap_or_default()
    })
}

/// Number of nodes the graph currently holds.
pub fn node_count(engine: &MotetEngine) -> usize {
    engine.context(|ctx| ctx.graph().len())
}

/// The automation timeline of the constant source behind a generator's
/// outlet, e.g. the param driven by `iter` or `object`.
pub fn outlet_events(engine: &MotetEngine, ugen: &UGen) -> Vec<AutomationEvent> {
    let Some(node) = ugen.outlet().node else {
        return Vec::new();
    };
    engine.context(|ctx| {
        ctx.graph()
            .control_of(node, "offset")
            .and_then(|control| ctx.graph().control(control))
            .map(|control| control.events().to_vec())
            .unwrap_or_default()
    })
}

/// Route `tracing` output through the test harness. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
