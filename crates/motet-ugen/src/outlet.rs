//! Scale/offset adapter applied to every built generator.
//!
//! `mul` (default 1) and `add` (default 0) are read from the spec. The
//! adapter inserts as few nodes as it can: the defaults insert none, a
//! numeric `add` only moves the constant offset, and a numeric `mul` reuses
//! a gain the unit flagged as madd-optimizable.

use crate::spec::Spec;
use crate::unit::Unit;
use motet_core::util::finite;
use motet_core::{Context, Input, Outlet, Target};

enum Operand {
    Number(f64),
    Signal(Input),
}

fn operand(spec: &Spec, key: &str, identity: f64) -> Operand {
    match spec.get(key) {
        Some(value) => match (value.as_f64(), value.as_input()) {
            (Some(n), _) => Operand::Number(n),
            (None, Some(input)) if !input.is_null() => Operand::Signal(input),
            _ => Operand::Number(identity),
        },
        None => Operand::Number(identity),
    }
}

pub fn make_outlet(ctx: &mut Context, unit: &Unit, spec: &Spec) -> Outlet {
    let base = match &unit.outlet {
        Some(input) => input.outlet(ctx),
        None => Outlet::NULL,
    };
    let mut node = base.node;
    let mut offset = finite(unit.offset) + base.offset;

    match operand(spec, "mul", 1.0) {
        Operand::Number(mul) if mul == 0.0 => {
            node = None;
            offset = 0.0;
        }
        Operand::Number(mul) if mul == 1.0 => {}
        Operand::Number(mul) => {
            offset *= mul;
            if let Some(outlet) = node {
                let graph = ctx.graph_mut();
                if graph.is_madd_optimizable(outlet) {
                    graph.set_control_value(outlet, "gain", mul);
                    graph.set_madd_optimizable(outlet, false);
                } else {
                    let gain = graph.create_gain(mul);
                    graph.connect(outlet, Target::Node(gain));
                    node = Some(gain);
                }
            }
        }
        Operand::Signal(mul) => {
            // the offset is scaled by the signal too, so fold it in first
            let source = ctx.outlet_to_node(Outlet { node, offset });
            offset = 0.0;
            node = source.map(|source| {
                let gain = ctx.graph_mut().create_gain(0.0);
                ctx.graph_mut().connect(source, Target::Node(gain));
                if let Some(control) = ctx.graph().control_of(gain, "gain") {
                    ctx.connect(mul, control);
                }
                gain
            });
        }
    }

    match operand(spec, "add", 0.0) {
        Operand::Number(add) => offset += add,
        Operand::Signal(add) => match node {
            Some(outlet) => {
                let gain = ctx.graph_mut().create_gain(1.0);
                ctx.graph_mut().connect(outlet, Target::Node(gain));
                ctx.connect(add, gain);
                node = Some(gain);
            }
            None => {
                let added = add.outlet(ctx);
                node = added.node;
                offset += added.offset;
            }
        },
    }

    Outlet {
        node,
        offset: finite(offset),
    }
}
