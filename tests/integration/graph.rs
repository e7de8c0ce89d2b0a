//! Graph integration tests
//!
//! Tests ugen outlets (mul/add adapters and summation) and routing them
//! through the context's buses.

use motet::core::Target;
use motet::prelude::*;
use motet::ugen::SynthHandle;

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::*;

fn build(engine: &MotetEngine, key: &str, spec: Spec, inputs: &[Input]) -> UGen {
    let (handle, _events) = SynthHandle::new(engine.registry().clone());
    engine
        .context(|ctx| UGen::build(&handle, ctx, key, spec, inputs))
        .unwrap()
}

#[test]
fn test_identity_mul_add_inserts_nothing() {
    let engine = test_engine();

    let before = node_count(&engine);
    let plain = build(&engine, "sin", Spec::new(), &[]);
    let plain_nodes = node_count(&engine) - before;

    let before = node_count(&engine);
    let explicit = build(&engine, "sin", spec! { "mul" => 1.0, "add" => 0.0 }, &[]);
    assert_eq!(node_count(&engine) - before, plain_nodes);

    assert_eq!(plain.outlet().offset, 0.0);
    assert_eq!(explicit.outlet().offset, 0.0);
    let name = engine
        .context(|ctx| ctx.graph().snapshot(explicit.outlet().node.unwrap()))
        .unwrap()
        .name;
    assert_eq!(name, "OscillatorNode#sine");
}

#[test]
fn test_numeric_mul_add_on_signal() {
    let engine = test_engine();
    let osc = build(&engine, "sin", spec! { "mul" => 0.5, "add" => 2.0 }, &[]);

    let outlet = osc.outlet();
    assert_eq!(outlet.offset, 2.0);
    let snapshot = engine
        .context(|ctx| ctx.graph().snapshot(outlet.node.unwrap()))
        .unwrap();
    assert_eq!(snapshot.name, "GainNode");
    assert_eq!(snapshot.control("gain").unwrap().value, 0.5);
    assert_eq!(snapshot.inputs[0].name, "OscillatorNode#sine");
}

#[test]
fn test_mul_zero_is_silent() {
    let engine = test_engine();
    let osc = build(&engine, "saw", spec! { "mul" => 0.0 }, &[]);
    assert!(osc.outlet().is_null());
}

#[test]
fn test_sum_of_numbers() {
    let engine = test_engine();
    let inputs = [Input::from(1.0), Input::from(2.0), Input::from(3.0)];
    let sum = build(&engine, "+", Spec::new(), &inputs);

    let snapshot = engine
        .context(|ctx| ctx.graph().snapshot(sum.outlet().node.unwrap()))
        .unwrap();
    assert_eq!(snapshot.name, "GainNode");
    assert_eq!(snapshot.control("gain").unwrap().value, 6.0);
    assert_eq!(snapshot.inputs.len(), 1);
    assert_eq!(snapshot.inputs[0].name, "ConstantSourceNode");
}

#[test]
fn test_sum_of_signals() {
    let engine = test_engine();
    let a = build(&engine, "sin", Spec::new(), &[]);
    let b = build(&engine, "tri", Spec::new(), &[]);
    let sum = build(&engine, "+", Spec::new(), &[a.into(), b.into(), Input::from(0.25)]);

    assert_eq!(sum.outlet().offset, 0.25);
    let snapshot = engine
        .context(|ctx| ctx.graph().snapshot(sum.outlet().node.unwrap()))
        .unwrap();
    let inputs: Vec<_> = snapshot.inputs.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(inputs, vec!["OscillatorNode#sine", "OscillatorNode#triangle"]);
}

#[test]
fn test_product_modulates_gain() {
    let engine = test_engine();
    let carrier = build(&engine, "sin", Spec::new(), &[]);
    let modulator = build(&engine, "saw", Spec::new(), &[]);
    let product = build(&engine, "*", Spec::new(), &[carrier.into(), modulator.into()]);

    let snapshot = engine
        .context(|ctx| ctx.graph().snapshot(product.outlet().node.unwrap()))
        .unwrap();
    assert_eq!(snapshot.inputs[0].name, "OscillatorNode#sine");
    let gain = snapshot.control("gain").unwrap();
    assert_eq!(gain.value, 0.0);
    assert_eq!(gain.inputs[0].name, "OscillatorNode#sawtooth");
}

#[test]
fn test_passthrough_ugen_adds_no_nodes() {
    let engine = test_engine();
    engine
        .register("id", |_, _, inputs| {
            Ok(Unit::builder()
                .outlet(inputs.first().cloned().unwrap_or_default())
                .build())
        })
        .unwrap();

    let before = node_count(&engine);
    let id = build(&engine, "id", Spec::new(), &[Input::from(5.0)]);
    assert_eq!(id.outlet().constant_value(), Some(5.0));
    assert_eq!(node_count(&engine), before);
}

#[test]
fn test_unknown_key_fails() {
    let engine = test_engine();
    let (handle, _events) = SynthHandle::new(engine.registry().clone());
    let result = engine.context(|ctx| UGen::build(&handle, ctx, "nope", Spec::new(), &[]));
    assert!(result.is_err());
}

#[test]
fn test_bus_routing_with_offset() {
    let engine = test_engine();
    let osc = build(&engine, "sin", spec! { "add" => 1.0 }, &[]);

    engine.start().connect_bus(&osc, 3);
    let (bus, inputs) = engine.context(|ctx| {
        let bus = ctx.bus(3).unwrap();
        (bus.node(), bus.inputs().to_vec())
    });
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0], osc.outlet().node.unwrap());

    engine.disconnect(&osc);
    assert!(engine.context(|ctx| ctx.bus(3).unwrap().is_idle()));
    let node = osc.outlet().node.unwrap();
    assert!(!engine.context(|ctx| ctx.graph().is_connected(node, Target::Node(bus))));
}

#[test]
fn test_bus_index_is_clamped() {
    let engine = test_engine();
    let osc = build(&engine, "square", Spec::new(), &[]);
    engine.connect_bus(&osc, 99);
    engine.connect_bus(&osc, -4);

    engine.context(|ctx| {
        let top = ctx.bus(motet::core::AUDIO_BUS_CHANNELS as usize).unwrap();
        assert_eq!(top.inputs().len(), 1);
        assert_eq!(ctx.bus(0).unwrap().inputs().len(), 1);
    });
}

#[test]
fn test_bus_zero_feeds_analyser_after_start() {
    let engine = test_engine();
    engine.start();
    engine.context(|ctx| {
        let bus = ctx.bus(0).unwrap().node();
        let analyser = ctx.analyser();
        assert!(ctx.graph().is_connected(bus, Target::Node(analyser)));
    });
}
