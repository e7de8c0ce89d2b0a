//! `iter`: steps a param through a sequence, one value per `next` call.

use crate::error::Result;
use crate::sequence::{Sequence, Step};
use crate::spec::{Spec, SpecValue};
use crate::ugen::{UGenEmitter, UGenScope};
use crate::unit::Unit;
use motet_core::util::finite;
use motet_core::{Context, Input, Param};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Iterate,
    Finished,
}

struct Iter {
    sequence: Mutex<Option<Sequence>>,
    state: Mutex<IterState>,
    param: Param,
    emitter: UGenEmitter,
}

impl Iter {
    fn pull(&self) -> Step {
        match self.sequence.lock().as_ref() {
            Some(sequence) => sequence.next(),
            None => Step::Done,
        }
    }

    fn finish(&self, playback_time: f64) {
        *self.state.lock() = IterState::Finished;
        self.emitter.end(playback_time);
    }

    fn start(&self, ctx: &mut Context, playback_time: f64) {
        match self.pull() {
            Step::Done => self.finish(playback_time),
            Step::Value(value) => self.param.set_value_at_time(ctx, value, playback_time),
        }
    }

    fn next(&self, ctx: &mut Context, playback_time: f64) {
        if *self.state.lock() != IterState::Iterate {
            return;
        }
        let t0 = finite(playback_time);
        match self.pull() {
            Step::Done => self.finish(t0),
            Step::Value(value) => self.param.update(ctx, value, t0, None),
        }
    }

    fn set_sequence(&self, sequence: Sequence) {
        *self.sequence.lock() = Some(sequence);
    }
}

/// A numeric source is a single-element sequence; anything else that is not
/// a sequence leaves the generator empty.
fn sequence_of(value: Option<&SpecValue>) -> Option<Sequence> {
    let value = value?;
    match value.as_sequence() {
        Some(sequence) => Some(sequence.clone()),
        None => value.as_f64().map(Sequence::once),
    }
}

pub(super) fn iter(scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let sequence = sequence_of(spec.get("iter")).or_else(|| sequence_of(spec.get("value")));
    let emitter = scope.emitter();
    let ctx = scope.ctx();
    let param = Param::new(ctx, 0.0, spec.param_config());
    let outlet = param.to_node(ctx, inputs);

    let iter = Arc::new(Iter {
        sequence: Mutex::new(sequence),
        state: Mutex::new(IterState::Iterate),
        param,
        emitter,
    });

    let on_start = iter.clone();
    let on_next = iter.clone();
    let on_set = iter;
    Ok(Unit::builder()
        .outlet(outlet)
        .start(move |ctx, t| on_start.start(ctx, t))
        .method("next", move |ctx, call| on_next.next(ctx, call.playback_time))
        .method("setValue", move |_, call| {
            if let Some(sequence) = call.value.as_ref().and_then(SpecValue::as_sequence) {
                on_set.set_sequence(sequence.clone());
            }
        })
        .build())
}
