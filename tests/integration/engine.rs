//! Engine lifecycle integration tests
//!
//! Tests engine construction, configuration validation, start/reset and
//! offline rendering.

use motet::prelude::*;
use motet::ugen::UGenError;

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::*;

#[test]
fn test_engine_default_config() {
    let engine = MotetEngine::builder().build().unwrap();
    assert_eq!(engine.sample_rate(), 44100.0);
    assert_eq!(engine.bpm(), 120.0);
    assert!(!engine.is_started());
    assert_eq!(engine.pending_events(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let err = MotetEngine::builder().sample_rate(0.0).build().unwrap_err();
    assert!(matches!(err, Error::Core(motet::core::Error::InvalidConfig(_))));

    let err = MotetEngine::builder().buffer_size(0).build().unwrap_err();
    assert!(matches!(err, Error::Core(motet::core::Error::InvalidConfig(_))));

    let err = MotetEngine::builder().bpm(f64::NAN).build().unwrap_err();
    assert!(matches!(err, Error::Core(motet::core::Error::InvalidTempo(_))));
}

#[test]
fn test_start_is_idempotent() {
    let engine = test_engine();
    engine.start();
    assert!(engine.is_started());
    engine.start().start();
    assert!(engine.is_started());
    assert_eq!(engine.context(|ctx| ctx.increment()), TEST_INCREMENT);
}

#[test]
fn test_process_before_start_dispatches_nothing() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.0, 0, &fired);

    engine.process(Some(0.0));
    assert!(fired.lock().is_empty());

    engine.start().process(Some(0.0));
    assert_eq!(fired.lock().len(), 1);
}

#[test]
fn test_reset_drops_pending_work() {
    let engine = test_engine();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 5.0, 0, &fired);
    engine.start().connect_bus(1.0, 2);
    assert_eq!(engine.pending_events(), 1);

    engine.reset();
    assert!(!engine.is_started());
    assert_eq!(engine.pending_events(), 0);
    assert!(engine.context(|ctx| ctx.bus(2).is_none()));

    engine.start().process(Some(5.0));
    assert!(fired.lock().is_empty());
}

#[test]
fn test_reset_frees_synth_nodes() {
    let engine = test_engine();
    let base = node_count(&engine);
    let synth = engine
        .synth(|dollar| dollar.call("sin", spec! { "mul" => 0.5, "add" => 0.1 }, vec![]))
        .unwrap();
    engine.start().play(&synth, 0.0);
    engine.process(Some(0.0));
    assert!(node_count(&engine) > base);

    engine.reset();
    assert_eq!(node_count(&engine), base);
}

#[test]
fn test_host_clock_fallback() {
    let (engine, clock) = test_engine_with_clock();
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 1.05, 0, &fired);
    engine.start();

    clock.set(1.0);
    engine.process(None);
    assert_eq!(*fired.lock(), vec![(0, 1.05)]);
    assert!(engine.current_time() >= 1.05);
}

#[test]
fn test_offline_engine_renders_on_start() {
    let engine = offline_engine(1.0);
    let fired = log::<(usize, f64)>();
    sched_recording(&engine, 0.25, 0, &fired);
    sched_recording(&engine, 1.0, 1, &fired);
    sched_recording(&engine, 1.5, 2, &fired);

    engine.start();
    assert_eq!(*fired.lock(), vec![(0, 0.25), (1, 1.0)]);
    assert_eq!(engine.pending_events(), 1);
}

#[test]
fn test_offline_duration_is_capped() {
    let engine = offline_engine(1.0e6);
    engine.start();
    assert_eq!(engine.context(|ctx| ctx.increment()), motet::core::MAX_RENDERING_SEC);
}

#[test]
fn test_register_custom_ugen() {
    let engine = test_engine();
    engine
        .register("dc", |_, spec, _| {
            Ok(Unit::builder().outlet(spec.f64_or("value", 0.0)).build())
        })
        .unwrap();
    assert!(engine.registry().has_type("dc"));

    let synth = engine
        .synth(|dollar| dollar.call("dc", spec! { "value" => 0.5 }, vec![]))
        .unwrap();
    assert_eq!(synth.db().len(), 1);
    assert_eq!(synth.db().find("dc")[0].outlet().constant_value(), Some(0.5));
}

#[test]
fn test_register_invalid_name() {
    let engine = test_engine();
    let err = engine
        .register("not a name", |_, _, _| Ok(Unit::builder().outlet(0.0).build()))
        .unwrap_err();
    assert!(matches!(err, Error::UGen(UGenError::InvalidName(_))));
}

#[test]
fn test_shared_registry() {
    let registry = UGenRegistry::default();
    let a = MotetEngine::builder().registry(registry.clone()).build().unwrap();
    let b = MotetEngine::builder().registry(registry).build().unwrap();

    a.register("dc", |_, _, _| Ok(Unit::builder().outlet(1.0).build()))
        .unwrap();
    assert!(b.registry().has_type("dc"));
}

#[test]
fn test_set_bpm_clamps() {
    let engine = test_engine();
    engine.set_bpm(90.0);
    assert_eq!(engine.bpm(), 90.0);
    engine.set_bpm(-1.0);
    assert!(engine.bpm() > 0.0);
}
