//! Synth integration tests
//!
//! Tests synth definitions end to end: the `$` builder, declared params,
//! forward references and the control-rate generators.

use motet::core::{AtomicDouble, AutomationEvent, NodeSnapshot};
use motet::prelude::*;
use motet::ugen::{SynthState, UGenError, Watch, WatchedFields};
use std::sync::Arc;

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::*;

/// Whether a node named `name` is somewhere upstream of `node`.
fn feeds(node: &NodeSnapshot, name: &str) -> bool {
    node.inputs.iter().any(|input| input.name == name || feeds(input, name))
}

#[test]
fn test_synth_plays_on_bus_zero() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| dollar.call("sin", spec! { "mul" => 0.2 }, vec![]))
        .unwrap();
    assert_eq!(synth.state(), SynthState::Ready);

    engine.start().play(&synth, 0.0);
    assert_eq!(synth.state(), SynthState::Running);
    engine.process(Some(0.0));
    let inputs = engine.context(|ctx| ctx.bus(0).unwrap().inputs().to_vec());
    assert_eq!(inputs, vec![synth.outlet()]);

    engine.release(&synth, 0.5);
    assert_eq!(synth.state(), SynthState::Stopped);
    engine.process(Some(0.5));
    assert!(engine.context(|ctx| ctx.bus(0).unwrap().is_idle()));
}

#[test]
fn test_play_twice_starts_once() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| dollar.call("saw", Spec::new(), vec![]))
        .unwrap();
    engine.start().play(&synth, 0.0).play(&synth, 0.0);
    assert_eq!(engine.pending_events(), 1);
}

#[test]
fn test_param_first_declaration_wins() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let freq = dollar.call("@freq", Spec::new(), vec![Input::from(440.0)])?;
            let again = dollar.call("@freq", Spec::new(), vec![Input::from(880.0)])?;
            let osc = dollar.call("sin", spec! { "freq" => freq }, vec![])?;
            Ok(Input::List(vec![osc, again]))
        })
        .unwrap();

    assert_eq!(synth.param_names(), vec!["freq"]);
    assert_eq!(synth.param("freq").unwrap().value_of(), 440.0);
    // params are not generators of the synth
    assert_eq!(synth.db().len(), 1);
}

#[test]
fn test_param_automation() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let spec = spec! { "curve" => "lin", "lag" => 0.5 };
            let amp = dollar.call("@amp", spec, vec![Input::from(0.1)])?;
            dollar.call("tri", spec! { "mul" => amp }, vec![])
        })
        .unwrap();

    let amp = synth.param("amp").unwrap();
    engine.context(|ctx| amp.update(ctx, 0.8, 1.0, None));
    assert_eq!(amp.value_of(), 0.8);
    assert_eq!(
        param_events(&engine, amp),
        vec![
            AutomationEvent::SetValue { value: 0.1, time: 1.0 },
            AutomationEvent::LinearRamp { value: 0.8, time: 1.5 },
        ]
    );
}

#[test]
fn test_param_with_inputs_scales_their_sum() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let osc = dollar.call("sin", Spec::new(), vec![])?;
            dollar.call("@amp", Spec::new(), vec![osc, Input::from(0.5)])
        })
        .unwrap();

    let amp = synth.param("amp").unwrap();
    assert_eq!(amp.value_of(), 0.5);
    engine.context(|ctx| {
        let snapshot = ctx.graph().snapshot(synth.outlet()).unwrap();
        let scaled = &snapshot.inputs[0];
        assert_eq!(scaled.name, "GainNode");
        assert_eq!(scaled.control("gain").unwrap().inputs[0].name, "ConstantSourceNode");
        assert!(feeds(scaled, "OscillatorNode#sine"));
    });
}

#[test]
fn test_invalid_param_name() {
    let engine = test_engine();
    let err = engine
        .synth(|dollar| dollar.call("@Freq", Spec::new(), vec![]))
        .unwrap_err();
    assert!(matches!(err, Error::UGen(UGenError::InvalidParamName(_))));
}

#[test]
fn test_build_error_leaves_buses_untouched() {
    let engine = test_engine();
    let err = engine
        .synth(|dollar| dollar.call("missing", Spec::new(), vec![]))
        .unwrap_err();
    assert!(matches!(err, Error::UGen(UGenError::UnknownKey(_))));
    assert!(engine.context(|ctx| ctx.bus(0).is_none()));
}

#[test]
fn test_forward_reference_connects_when_built() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let lfo = dollar.call("#lfo", Spec::new(), vec![])?;
            let osc = dollar.call("sin", spec! { "freq" => lfo }, vec![])?;
            dollar.call(
                "tri#lfo",
                spec! { "freq" => 2.0, "mul" => 100.0, "add" => 440.0 },
                vec![],
            )?;
            Ok(osc)
        })
        .unwrap();

    let lfo = synth.db().find_by_id("lfo").unwrap();
    assert_eq!(lfo.key(), "tri");
    let osc = synth.db().find("sin")[0].outlet().node.unwrap();
    engine.context(|ctx| {
        let snapshot = ctx.graph().snapshot(osc).unwrap();
        let freq = snapshot.control("frequency").unwrap();
        let names: Vec<_> = freq.inputs.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["GainNode", "ConstantSourceNode"]);
    });
}

#[test]
fn test_forward_reference_read_as_outlet() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let lfo = dollar.call("#lfo", Spec::new(), vec![])?;
            let carrier = dollar.call("sin", Spec::new(), vec![])?;
            let product = dollar.call("*", Spec::new(), vec![lfo.clone(), carrier])?;
            let stepped = dollar.call(
                "iter",
                spec! { "iter" => Sequence::new(vec![0.5]) },
                vec![lfo.clone()],
            )?;
            let detuned = dollar.call(
                "saw",
                spec! { "freq" => Input::List(vec![lfo, Input::from(2.0)]) },
                vec![],
            )?;
            dollar.call("tri#lfo", Spec::new(), vec![])?;
            Ok(Input::List(vec![product, stepped, detuned]))
        })
        .unwrap();

    let node_of = |key: &str| synth.db().find(key)[0].outlet().node.unwrap();
    let (product, stepped, detuned) = (node_of("*"), node_of("iter"), node_of("saw"));
    engine.context(|ctx| {
        let product = ctx.graph().snapshot(product).unwrap();
        assert!(feeds(&product, "OscillatorNode#triangle"));

        let stepped = ctx.graph().snapshot(stepped).unwrap();
        assert!(feeds(&stepped, "OscillatorNode#triangle"));

        let detuned = ctx.graph().snapshot(detuned).unwrap();
        let freq = detuned.control("frequency").unwrap();
        assert!(freq
            .inputs
            .iter()
            .any(|input| feeds(input, "OscillatorNode#triangle")));
    });
}

#[test]
fn test_unresolved_reference_is_silent() {
    init_tracing();
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let ghost = dollar.call("#ghost", Spec::new(), vec![])?;
            dollar.call("+", Spec::new(), vec![ghost])
        })
        .unwrap();
    let sum = synth.db().find("+")[0].outlet().node.unwrap();
    engine.context(|ctx| {
        assert!(ctx.graph().node(sum).unwrap().inputs().is_empty());
    });
}

#[test]
fn test_iter_steps_then_ends() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| dollar.call(Sequence::new(vec![0.1, 0.2]), Spec::new(), vec![]))
        .unwrap();
    engine.start().play(&synth, 0.0);
    engine.process(Some(0.0));

    let iter = synth.db().find("iter")[0].clone();
    assert_eq!(engine.call(&synth, "iter", "next", MethodCall::at(1.0)), 1);
    assert!(synth.drain_events().is_empty());
    engine.call(&synth, "iter", "next", MethodCall::at(2.0));
    engine.call(&synth, "iter", "next", MethodCall::at(3.0));

    assert_eq!(
        outlet_events(&engine, &iter),
        vec![
            AutomationEvent::SetValue { value: 0.1, time: 0.0 },
            AutomationEvent::SetValue { value: 0.2, time: 1.0 },
        ]
    );
    assert_eq!(
        synth.drain_events(),
        vec![UGenEvent::End {
            key: "iter".to_string(),
            id: None,
            playback_time: 2.0,
        }]
    );
}

#[test]
fn test_iter_interval_repeats() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let spec = spec! { "iter" => SynthDollar::interval(0.5) };
            dollar.call("iter#clock", spec, vec![])
        })
        .unwrap();
    engine.start().play(&synth, 0.0);
    engine.process(Some(0.0));
    for step in 1..=4 {
        engine.call(&synth, "#clock", "next", MethodCall::at(step as f64));
    }

    let iter = synth.db().find_by_id("clock").unwrap();
    assert_eq!(outlet_events(&engine, &iter).len(), 5);
    assert!(synth.drain_events().is_empty());
}

#[test]
fn test_object_follows_watched_value() {
    let engine = test_engine();
    let level = Arc::new(AtomicDouble::new(0.25));
    let target: Arc<dyn Watch> = level.clone();
    let synth = engine
        .synth(|dollar| dollar.call(target, spec! { "interval" => 0.1 }, vec![]))
        .unwrap();

    let object = synth.db().find("object")[0].clone();
    engine.start().play(&synth, 0.0);
    engine.process(Some(0.0));
    assert!(outlet_events(&engine, &object).is_empty());

    level.set(0.5);
    engine.process(Some(TEST_INCREMENT));
    let changed = outlet_events(&engine, &object)
        .iter()
        .any(|event| matches!(event, AutomationEvent::SetValue { value, .. } if *value == 0.5));
    assert!(changed);

    engine.release(&synth, 0.3);
    engine.process(Some(0.3));
    assert_eq!(engine.pending_events(), 0);
}

#[test]
fn test_object_reads_named_field() {
    let engine = test_engine();
    let fields = Arc::new(WatchedFields::new());
    fields.set("cutoff", 1200.0);
    fields.set("resonance", 3.0);
    let target: Arc<dyn Watch> = fields.clone();

    let synth = engine
        .synth(|dollar| dollar.call(target, spec! { "key" => "cutoff" }, vec![]))
        .unwrap();
    let object = synth.db().find("object")[0].clone();
    let node = object.outlet().node.unwrap();
    assert_eq!(
        engine.context(|ctx| ctx.graph().control_value(node, "offset")),
        Some(1200.0)
    );
}

#[test]
fn test_stop_at_time_notation() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            dollar.stop_at("1n");
            dollar.call("square", Spec::new(), vec![])
        })
        .unwrap();
    engine.start().play(&synth, 0.0);

    engine.process(Some(1.0));
    assert_eq!(synth.state(), SynthState::Running);
    engine.process(Some(1.95));
    assert_eq!(synth.state(), SynthState::Stopped);
    assert!(engine.context(|ctx| ctx.bus(0).unwrap().is_idle()));
}

#[test]
fn test_call_reaches_selected_generators() {
    let engine = test_engine();
    let synth = engine
        .synth(|dollar| {
            let a = dollar.call(
                "iter.voice",
                spec! { "iter" => Sequence::new(vec![1.0, 2.0]) },
                vec![],
            )?;
            let b = dollar.call(
                "iter.voice",
                spec! { "iter" => Sequence::new(vec![3.0, 4.0]) },
                vec![],
            )?;
            let c = dollar.call("number#level", spec! { "value" => 0.5 }, vec![])?;
            Ok(Input::List(vec![a, b, c]))
        })
        .unwrap();
    engine.start().play(&synth, 0.0);
    engine.process(Some(0.0));

    assert_eq!(engine.call(&synth, ".voice", "next", MethodCall::at(1.0)), 2);
    assert_eq!(engine.call(&synth, "#level", "next", MethodCall::at(1.0)), 0);
    let set = MethodCall::at(1.0).with_value(0.75);
    assert_eq!(engine.call(&synth, "number", "setValue", set), 1);
}
