//! Generators wrapping host node types.
//!
//! Each control of the node can be driven from the spec under its own name:
//! a number sets it, a signal modulates it, a sequence or watch target is
//! wrapped in a control-rate generator first.

use crate::error::Result;
use crate::registry::UGenConstructor;
use crate::spec::Spec;
use crate::ugen::UGenScope;
use crate::unit::Unit;
use motet_core::{Input, NodeGraph, NodeId, NodeKind};
use std::sync::Arc;

pub(super) const OSCILLATOR: &[(&str, f64)] = &[("frequency", 440.0), ("detune", 0.0)];

pub(super) const BIQUAD: &[(&str, f64)] = &[
    ("frequency", 350.0),
    ("detune", 0.0),
    ("Q", 1.0),
    ("gain", 0.0),
];

pub(super) const DELAY: &[(&str, f64)] = &[("delayTime", 0.0)];

pub(super) const COMPRESSOR: &[(&str, f64)] = &[
    ("threshold", -24.0),
    ("knee", 30.0),
    ("ratio", 12.0),
    ("attack", 0.003),
    ("release", 0.25),
];

/// Spec keys accepted besides the control name itself.
fn alias(control: &str) -> Option<&'static str> {
    match control {
        "frequency" => Some("freq"),
        "delayTime" => Some("delay"),
        _ => None,
    }
}

/// Nodes that produce sound on their own and take no audio input.
pub(super) fn is_source(graph: &NodeGraph, node: NodeId) -> bool {
    match graph.node(node).map(|n| n.kind()) {
        Some(NodeKind::ConstantSource) => true,
        Some(NodeKind::Native(name)) => name.contains("Oscillator") || name.contains("Source"),
        _ => false,
    }
}

fn build(
    scope: &mut UGenScope<'_>,
    spec: &Spec,
    inputs: &[Input],
    type_name: &str,
    label: Option<&str>,
    controls: &[(&str, f64)],
) -> Result<Unit> {
    let node = scope.ctx().graph_mut().create_native(type_name, controls);
    if let Some(label) = label {
        scope.ctx().graph_mut().set_label(node, label);
    }

    for (name, _) in controls {
        let value = spec
            .get(name)
            .or_else(|| alias(name).and_then(|alias| spec.get(alias)));
        let control = scope.ctx().graph().control_of(node, name);
        if let (Some(value), Some(control)) = (value, control) {
            scope.connect_control(value, control)?;
        }
    }

    if !is_source(scope.ctx().graph(), node) {
        for input in inputs {
            scope.ctx().connect(input.clone(), node);
        }
    }
    Ok(Unit::builder().outlet(node).build())
}

/// `OscillatorNode` labelled with its waveform.
pub(super) fn oscillator(wave: &'static str) -> UGenConstructor {
    Arc::new(move |scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]| {
        build(scope, spec, inputs, "OscillatorNode", Some(wave), OSCILLATOR)
    })
}

/// `BiquadFilterNode` labelled with its filter type.
pub(super) fn biquad(kind: &'static str) -> UGenConstructor {
    Arc::new(move |scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]| {
        build(scope, spec, inputs, "BiquadFilterNode", Some(kind), BIQUAD)
    })
}

pub(super) fn native(
    type_name: &'static str,
    controls: &'static [(&'static str, f64)],
) -> UGenConstructor {
    Arc::new(move |scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]| {
        build(scope, spec, inputs, type_name, None, controls)
    })
}
