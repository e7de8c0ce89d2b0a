//! Automatable control values (the native "audio param" primitive).

use crate::util::finite;
use serde::{Deserialize, Serialize};

/// One entry on a control's automation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AutomationEvent {
    SetValue {
        value: f64,
        time: f64,
    },
    LinearRamp {
        value: f64,
        time: f64,
    },
    ExponentialRamp {
        value: f64,
        time: f64,
    },
    /// Exponential approach toward `target` starting at `time`.
    SetTarget {
        target: f64,
        time: f64,
        time_constant: f64,
    },
}

impl AutomationEvent {
    #[inline]
    pub fn time(&self) -> f64 {
        match self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::ExponentialRamp { time, .. }
            | AutomationEvent::SetTarget { time, .. } => *time,
        }
    }
}

/// Active set-target curve: (target, start time, time constant).
type TargetCurve = Option<(f64, f64, f64)>;

#[inline]
fn settle(value: f64, curve: TargetCurve, at: f64) -> f64 {
    match curve {
        Some((target, start, time_constant)) if time_constant > 0.0 => {
            target + (value - target) * (-(at - start) / time_constant).exp()
        }
        Some((target, _, _)) => target,
        None => value,
    }
}

/// A scalar control with an automation timeline.
///
/// Events are kept sorted by time; events at the same time keep their
/// insertion order. Nodes connected into the control (see
/// [`NodeGraph::connect`](super::NodeGraph::connect)) are recorded as
/// modulation inputs.
#[derive(Debug, Clone)]
pub struct Control {
    value: f64,
    default_value: f64,
    events: Vec<AutomationEvent>,
    pub(crate) inputs: Vec<super::NodeId>,
}

impl Control {
    pub fn new(value: f64) -> Self {
        let value = finite(value);
        Self {
            value,
            default_value: value,
            events: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Intrinsic value (used before the first automation event).
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = finite(value);
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn inputs(&self) -> &[super::NodeId] {
        &self.inputs
    }

    fn insert(&mut self, event: AutomationEvent) {
        let time = event.time();
        let index = self.events.partition_point(|e| e.time() <= time);
        self.events.insert(index, event);
    }

    /// Drop the events before the last `SetValue` at or before `time`. That
    /// event fully determines the value from its own time on, so evaluation
    /// at `time` and later is unchanged.
    pub fn prune_before(&mut self, time: f64) {
        let due = self.events.partition_point(|e| e.time() <= time);
        let anchor = self.events[..due]
            .iter()
            .rposition(|e| matches!(e, AutomationEvent::SetValue { .. }));
        if let Some(anchor) = anchor.filter(|&index| index > 0) {
            self.events.drain(..anchor);
        }
    }

    pub fn set_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent::SetValue {
            value: finite(value),
            time: finite(time),
        });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent::LinearRamp {
            value: finite(value),
            time: finite(time),
        });
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent::ExponentialRamp {
            value: finite(value),
            time: finite(time),
        });
    }

    pub fn set_target_at_time(&mut self, target: f64, time: f64, time_constant: f64) {
        self.insert(AutomationEvent::SetTarget {
            target: finite(target),
            time: finite(time),
            time_constant: finite(time_constant).max(0.0),
        });
    }

    /// Drop every event at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        let time = finite(time);
        self.events.retain(|e| e.time() < time);
    }

    /// Evaluate the automation timeline at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        let mut value = self.value;
        let mut anchor = 0.0;
        let mut curve: TargetCurve = None;

        for event in &self.events {
            if event.time() > time {
                let start = settle(value, curve, anchor);
                return match *event {
                    AutomationEvent::LinearRamp { value: end, time: end_time }
                        if end_time > anchor =>
                    {
                        let ratio = (time - anchor) / (end_time - anchor);
                        start + (end - start) * ratio
                    }
                    AutomationEvent::ExponentialRamp { value: end, time: end_time }
                        if end_time > anchor && start * end > 0.0 =>
                    {
                        let ratio = (time - anchor) / (end_time - anchor);
                        start * (end / start).powf(ratio)
                    }
                    _ => settle(value, curve, time),
                };
            }

            match *event {
                AutomationEvent::SetValue { value: v, .. }
                | AutomationEvent::LinearRamp { value: v, .. }
                | AutomationEvent::ExponentialRamp { value: v, .. } => {
                    value = v;
                    curve = None;
                }
                AutomationEvent::SetTarget {
                    target,
                    time: start,
                    time_constant,
                } => {
                    value = settle(value, curve, start);
                    curve = Some((target, start, time_constant));
                }
            }
            anchor = event.time();
        }

        finite(settle(value, curve, time))
    }
}
