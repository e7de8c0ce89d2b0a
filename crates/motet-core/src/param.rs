//! Automatable scalar parameters.
//!
//! A [`Param`] owns a constant-source node whose `offset` control carries the
//! automation timeline. Control-rate generators move it with
//! [`Param::update`]; everything else reads it with [`Param::value_of`].
//!
//! Non-finite input is coerced to `0.0` rather than rejected.

use crate::context::Context;
use crate::native::{ControlId, NodeId, Target};
use crate::routing::Input;
use crate::util::finite;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transition policy used by [`Param::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Jump to the new value.
    #[default]
    Step,
    /// Ramp linearly from the previous value over `lag` seconds.
    Linear,
    /// Ramp exponentially over `lag` seconds (linear when an endpoint is not
    /// strictly positive).
    Exponential,
}

impl Curve {
    /// Parse `"step"`, `"lin"`/`"linear"` or `"exp"`/`"exponential"`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "step" => Some(Curve::Step),
            "lin" | "linear" => Some(Curve::Linear),
            "exp" | "exponential" => Some(Curve::Exponential),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamConfig {
    pub curve: Curve,
    /// Transition time in seconds; `0` means a step regardless of curve.
    pub lag: f64,
}

impl ParamConfig {
    pub fn new(curve: Curve, lag: f64) -> Self {
        Self {
            curve,
            lag: finite(lag).max(0.0),
        }
    }
}

#[derive(Debug)]
struct ParamState {
    value: f64,
    node: NodeId,
    control: ControlId,
    config: ParamConfig,
}

/// Shared handle to an automatable value. Clones refer to the same param.
#[derive(Debug, Clone)]
pub struct Param {
    state: Arc<Mutex<ParamState>>,
}

impl Param {
    pub fn new(ctx: &mut Context, value: f64, config: ParamConfig) -> Self {
        let value = finite(value);
        let graph = ctx.graph_mut();
        let node = graph.create_constant(value);
        // a constant source always owns an offset control
        let control = graph
            .control_of(node, "offset")
            .unwrap_or_else(|| unreachable!("constant source without offset control"));

        Self {
            state: Arc::new(Mutex::new(ParamState {
                value,
                node,
                control,
                config,
            })),
        }
    }

    /// The most recently set value.
    pub fn value_of(&self) -> f64 {
        self.state.lock().value
    }

    pub fn config(&self) -> ParamConfig {
        self.state.lock().config
    }

    /// Constant-source node emitting this param as a signal.
    pub fn node(&self) -> NodeId {
        self.state.lock().node
    }

    pub fn control(&self) -> ControlId {
        self.state.lock().control
    }

    /// Schedule a step to `value` at `time`.
    pub fn set_value_at_time(&self, ctx: &mut Context, value: f64, time: f64) {
        let mut state = self.state.lock();
        let value = finite(value);
        if let Some(control) = ctx.graph_mut().control_mut(state.control) {
            control.set_value_at_time(value, finite(time));
        }
        state.value = value;
    }

    /// Move from `previous` (defaults to the current value) to `value`
    /// starting at `time`, following the configured curve.
    pub fn update(&self, ctx: &mut Context, value: f64, time: f64, previous: Option<f64>) {
        let mut state = self.state.lock();
        let value = finite(value);
        let time = finite(time);
        let previous = finite(previous.unwrap_or(state.value));
        let ParamConfig { curve, lag } = state.config;

        if let Some(control) = ctx.graph_mut().control_mut(state.control) {
            match curve {
                _ if lag <= 0.0 => control.set_value_at_time(value, time),
                Curve::Step => control.set_value_at_time(value, time),
                Curve::Linear => {
                    control.set_value_at_time(previous, time);
                    control.linear_ramp_to_value_at_time(value, time + lag);
                }
                Curve::Exponential => {
                    control.set_value_at_time(previous, time);
                    if previous > 0.0 && value > 0.0 {
                        control.exponential_ramp_to_value_at_time(value, time + lag);
                    } else {
                        control.linear_ramp_to_value_at_time(value, time + lag);
                    }
                }
            }
        }
        state.value = value;
    }

    /// A connectable node for this param. With extra inputs, the inputs are
    /// summed and scaled by the param's value.
    pub fn to_node(&self, ctx: &mut Context, inputs: &[Input]) -> NodeId {
        let node = self.node();
        if inputs.is_empty() {
            return node;
        }

        let sum = Input::List(inputs.to_vec()).outlet(ctx);
        let gain = ctx.graph_mut().create_gain(0.0);
        if let Some(gain_control) = ctx.graph().control_of(gain, "gain") {
            ctx.graph_mut().connect(node, Target::Control(gain_control));
        }
        ctx.connect_outlet(sum, gain.into());
        gain
    }
}
