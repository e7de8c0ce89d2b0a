//! `object`: polls a watched value and follows it with a param.

use crate::error::{Result, UGenError};
use crate::spec::Spec;
use crate::ugen::UGenScope;
use crate::unit::Unit;
use crate::watch::Watch;
use motet_core::scheduler::EventId;
use motet_core::util::finite;
use motet_core::{Context, Input, Param, TimeValue};
use parking_lot::Mutex;
use std::sync::Arc;

const DEFAULT_INTERVAL: f64 = 0.25;

struct PollState {
    previous: f64,
    sched_id: EventId,
}

struct Poller {
    target: Arc<dyn Watch>,
    key: String,
    interval: TimeValue,
    param: Param,
    state: Mutex<PollState>,
}

/// The keyed field when there is one, the whole value otherwise.
fn read(target: &dyn Watch, key: &str) -> f64 {
    let field = if key.is_empty() { None } else { target.field(key) };
    finite(field.unwrap_or_else(|| target.value_of()))
}

impl Poller {
    /// Push a changed value and schedule the next poll. Tempo-relative
    /// intervals are re-evaluated on every poll.
    fn poll(self: Arc<Self>, ctx: &mut Context, playback_time: f64) {
        let value = read(self.target.as_ref(), &self.key);
        {
            let mut state = self.state.lock();
            if value != state.previous {
                self.param
                    .update(ctx, value, playback_time, Some(state.previous));
                state.previous = value;
            }
        }

        let interval = finite(ctx.to_seconds(&self.interval)).max(1.0 / ctx.sample_rate());
        let next = self.clone();
        let id = ctx.sched(playback_time + interval, move |ctx, t| next.poll(ctx, t));
        self.state.lock().sched_id = id;
    }

    fn stop(&self, ctx: &mut Context) {
        let id = std::mem::take(&mut self.state.lock().sched_id);
        ctx.unsched(id);
    }
}

pub(super) fn object(scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let target = match spec.get("value") {
        Some(value) => match (value.as_object(), value.as_f64()) {
            (Some(target), _) => target.clone(),
            (None, Some(constant)) => Arc::new(move || constant) as Arc<dyn Watch>,
            (None, None) => {
                return Err(UGenError::ConstructionFailed(format!(
                    "object: cannot watch a {}",
                    value.type_name()
                )))
            }
        },
        None => Arc::new(|| 0.0) as Arc<dyn Watch>,
    };
    let key = spec.str("key").unwrap_or_default().to_string();
    let interval = spec
        .time("interval")
        .unwrap_or(TimeValue::Seconds(DEFAULT_INTERVAL));

    let initial = read(target.as_ref(), &key);
    let ctx = scope.ctx();
    let poller = Arc::new(Poller {
        target,
        key,
        interval,
        param: Param::new(ctx, initial, spec.param_config()),
        state: Mutex::new(PollState {
            previous: initial,
            sched_id: EventId::NONE,
        }),
    });

    let outlet = poller.param.to_node(ctx, inputs);
    let on_start = poller.clone();
    let on_stop = poller;
    Ok(Unit::builder()
        .outlet(outlet)
        .start(move |ctx, t| on_start.clone().poll(ctx, t))
        .stop(move |ctx, _| on_stop.stop(ctx))
        .build())
}
