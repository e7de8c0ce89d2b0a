//! `+` and `*`.
//!
//! Numeric inputs fold into a single coefficient so a chain of constants
//! costs at most one constant source and one gain.

use crate::error::Result;
use crate::spec::Spec;
use crate::ugen::UGenScope;
use crate::unit::Unit;
use motet_core::{Input, Target};

/// Split inputs into a folded constant and the remaining signals. Lists are
/// flattened, nulls dropped.
fn partition(inputs: &[Input], identity: f64, fold: fn(f64, f64) -> f64) -> (f64, Vec<Input>) {
    fn walk(inputs: &[Input], acc: &mut f64, signals: &mut Vec<Input>, fold: fn(f64, f64) -> f64) {
        for input in inputs {
            match input {
                Input::Null => {}
                Input::Number(n) => *acc = fold(*acc, *n),
                Input::List(items) => walk(items, acc, signals, fold),
                other => signals.push(other.clone()),
            }
        }
    }
    let mut acc = identity;
    let mut signals = Vec::new();
    walk(inputs, &mut acc, &mut signals, fold);
    (acc, signals)
}

/// `value` as a gain fed by a unit constant source.
fn constant(scope: &mut UGenScope<'_>, value: f64) -> Unit {
    let graph = scope.ctx().graph_mut();
    let dc = graph.create_constant(1.0);
    let gain = graph.create_gain(value);
    graph.connect(dc, Target::Node(gain));
    Unit::builder().outlet(gain).build()
}

pub(super) fn sum(scope: &mut UGenScope<'_>, _spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let (offset, signals) = partition(inputs, 0.0, |a, b| a + b);

    if signals.is_empty() {
        if offset == 0.0 {
            return Ok(Unit::builder().outlet(0.0).build());
        }
        return Ok(constant(scope, offset));
    }

    let ctx = scope.ctx();
    let gain = ctx.graph_mut().create_gain(1.0);
    for signal in signals {
        ctx.connect(signal, gain);
    }
    ctx.graph_mut().set_madd_optimizable(gain, true);

    Ok(Unit::builder().outlet(gain).offset(offset).build())
}

pub(super) fn product(scope: &mut UGenScope<'_>, _spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let (coefficient, signals) = partition(inputs, 1.0, |a, b| a * b);

    if coefficient == 0.0 {
        return Ok(Unit::builder().outlet(Input::Null).build());
    }
    if signals.is_empty() {
        return Ok(constant(scope, coefficient));
    }
    if signals.len() == 1 && coefficient == 1.0 {
        return Ok(Unit::builder().outlet(signals[0].clone()).build());
    }

    let ctx = scope.ctx();
    let mut signals = signals.iter();
    let mut current = signals.next().and_then(|first| ctx.to_node(first));
    for signal in signals {
        let gain = ctx.graph_mut().create_gain(0.0);
        if let Some(node) = current {
            ctx.graph_mut().connect(node, Target::Node(gain));
        }
        if let Some(control) = ctx.graph().control_of(gain, "gain") {
            ctx.connect(signal.clone(), control);
        }
        current = Some(gain);
    }

    let outlet = match current {
        Some(node) if coefficient != 1.0 => {
            let gain = ctx.graph_mut().create_gain(coefficient);
            ctx.graph_mut().connect(node, Target::Node(gain));
            ctx.graph_mut().set_madd_optimizable(gain, true);
            Input::Node(gain)
        }
        Some(node) => Input::Node(node),
        None => Input::Null,
    };
    Ok(Unit::builder().outlet(outlet).build())
}

#[cfg(test)]
mod tests {
    use crate::registry::UGenRegistry;
    use crate::spec::Spec;
    use crate::ugen::{SynthHandle, UGen};
    use motet_core::{Context, ContextConfig, Input, ManualClock};

    fn setup() -> (Context, SynthHandle) {
        let ctx =
            Context::with_clock(ContextConfig::default(), Box::new(ManualClock::new(0.0))).unwrap();
        let (synth, _) = SynthHandle::new(UGenRegistry::default());
        (ctx, synth)
    }

    #[test]
    fn test_sum_folds_nested_lists() {
        let (mut ctx, synth) = setup();
        let inputs = [Input::from(vec![1.0, 2.0]), Input::Null, Input::from(3.0)];
        let ugen = UGen::build(&synth, &mut ctx, "+", Spec::new(), &inputs).unwrap();
        let gain = ugen.outlet().node.unwrap();
        assert_eq!(ctx.graph().control_value(gain, "gain"), Some(6.0));
    }

    #[test]
    fn test_sum_of_nothing_is_silent() {
        let (mut ctx, synth) = setup();
        let before = ctx.graph().len();
        let ugen = UGen::build(&synth, &mut ctx, "+", Spec::new(), &[]).unwrap();
        assert!(ugen.outlet().is_null());
        assert_eq!(ctx.graph().len(), before);
    }

    #[test]
    fn test_sum_with_signals() {
        let (mut ctx, synth) = setup();
        let a = ctx.graph_mut().create_native("OscillatorNode", &[]);
        let b = ctx.graph_mut().create_native("OscillatorNode", &[]);
        let inputs = [Input::Node(a), Input::from(0.5), Input::Node(b)];
        let ugen = UGen::build(&synth, &mut ctx, "+", Spec::new(), &inputs).unwrap();

        let gain = ugen.outlet().node.unwrap();
        assert_eq!(ctx.graph().node(gain).unwrap().inputs(), &[a, b]);
        assert!(ctx.graph().is_madd_optimizable(gain));
        assert_eq!(ugen.outlet().offset, 0.5);
    }

    #[test]
    fn test_product_of_zero_is_null() {
        let (mut ctx, synth) = setup();
        let osc = ctx.graph_mut().create_native("OscillatorNode", &[]);
        let inputs = [Input::Node(osc), Input::from(0.0)];
        let ugen = UGen::build(&synth, &mut ctx, "*", Spec::new(), &inputs).unwrap();
        assert!(ugen.outlet().is_null());
    }

    #[test]
    fn test_product_of_numbers() {
        let (mut ctx, synth) = setup();
        let inputs = [Input::from(2.0), Input::from(3.0)];
        let ugen = UGen::build(&synth, &mut ctx, "*", Spec::new(), &inputs).unwrap();
        let snapshot = ctx.graph().snapshot(ugen.outlet().node.unwrap()).unwrap();
        assert_eq!(snapshot.control("gain").unwrap().value, 6.0);
        assert_eq!(snapshot.inputs[0].name, "ConstantSourceNode");
    }

    #[test]
    fn test_product_modulates_signals() {
        let (mut ctx, synth) = setup();
        let carrier = ctx.graph_mut().create_native("OscillatorNode", &[]);
        let lfo = ctx.graph_mut().create_native("OscillatorNode", &[]);
        let inputs = [Input::Node(carrier), Input::Node(lfo), Input::from(0.5)];
        let ugen = UGen::build(&synth, &mut ctx, "*", Spec::new(), &inputs).unwrap();

        let outer = ctx.graph().snapshot(ugen.outlet().node.unwrap()).unwrap();
        assert_eq!(outer.control("gain").unwrap().value, 0.5);
        let ring = &outer.inputs[0];
        assert_eq!(ring.control("gain").unwrap().value, 0.0);
        assert_eq!(ring.control("gain").unwrap().inputs.len(), 1);
        assert_eq!(ring.inputs[0].name, "OscillatorNode");
    }

    #[test]
    fn test_product_single_signal_passes_through() {
        let (mut ctx, synth) = setup();
        let osc = ctx.graph_mut().create_native("OscillatorNode", &[]);
        let ugen = UGen::build(&synth, &mut ctx, "*", Spec::new(), &[Input::Node(osc)]).unwrap();
        assert_eq!(ugen.outlet().node, Some(osc));
    }
}
