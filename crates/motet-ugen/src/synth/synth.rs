use super::db::UGenDb;
use super::dollar::SynthDollar;
use crate::error::Result;
use crate::registry::UGenRegistry;
use crate::ugen::{SynthHandle, UGenEvent};
use crate::unit::MethodCall;
use crossbeam_channel::Receiver;
use hashbrown::HashMap;
use motet_core::{Context, Destination, Input, NodeId, Param};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthState {
    Ready,
    Running,
    Stopped,
}

struct SynthShared {
    output: NodeId,
    db: UGenDb,
    params: HashMap<String, Param>,
    state: Mutex<SynthState>,
}

impl SynthShared {
    fn start(self: &Arc<Self>, ctx: &mut Context, time: f64) {
        {
            let mut state = self.state.lock();
            if *state != SynthState::Ready {
                return;
            }
            *state = SynthState::Running;
        }
        let shared = self.clone();
        ctx.sched(time, move |ctx, t0| {
            for ugen in shared.db.iter() {
                ugen.start(ctx, t0);
            }
            ctx.connect(shared.output, Destination::Bus(0));
            debug!(playback_time = t0, ugens = shared.db.len(), "Synth started");
        });
    }

    fn stop(self: &Arc<Self>, ctx: &mut Context, time: f64) {
        let was_running = {
            let mut state = self.state.lock();
            let previous = *state;
            *state = SynthState::Stopped;
            previous == SynthState::Running
        };
        if !was_running {
            return;
        }
        let shared = self.clone();
        ctx.sched(time, move |ctx, t0| {
            ctx.disconnect(shared.output);
            for ugen in shared.db.iter() {
                ugen.stop(ctx, t0);
            }
            debug!(playback_time = t0, "Synth stopped");
        });
    }
}

/// A built synth definition: its generators, named params and a unity gain
/// summing its output.
pub struct Synth {
    shared: Arc<SynthShared>,
    events: Receiver<UGenEvent>,
}

impl Synth {
    /// Run `definition` against a fresh `$` builder and wire its result into
    /// the synth's output. Build errors are returned before anything is
    /// connected to a bus.
    ///
    /// # Example
    /// ```ignore
    /// let synth = Synth::new(&mut ctx, &registry, |dollar| {
    ///     let freq = dollar.call("@freq", Spec::new(), vec![Input::from(440.0)])?;
    ///     dollar.call("sin", spec! { "freq" => freq, "mul" => 0.2 }, vec![])
    /// })?;
    /// synth.start(&mut ctx, 0.0);
    /// ```
    pub fn new<F>(ctx: &mut Context, registry: &UGenRegistry, definition: F) -> Result<Synth>
    where
        F: FnOnce(&mut SynthDollar<'_>) -> Result<Input>,
    {
        let (handle, events) = SynthHandle::new(registry.clone());
        let mut dollar = SynthDollar::new(ctx, &handle);
        let outlet = definition(&mut dollar)?;
        let definition = dollar.finish();

        let output = ctx.graph_mut().create_gain(1.0);
        ctx.connect(outlet, output);

        let shared = Arc::new(SynthShared {
            output,
            db: definition.db,
            params: definition.params,
            state: Mutex::new(SynthState::Ready),
        });

        if let Some(stop_at) = definition.stop_at {
            let time = ctx.to_seconds(&stop_at);
            let stopper = shared.clone();
            ctx.sched(time, move |ctx, t0| stopper.stop(ctx, t0));
        }

        Ok(Synth { shared, events })
    }

    /// Start every generator at `time` and connect the output to bus 0.
    /// Only the first call has an effect.
    pub fn start(&self, ctx: &mut Context, time: f64) -> &Self {
        self.shared.start(ctx, time);
        self
    }

    /// Disconnect the output and run every stop hook at `time`.
    pub fn stop(&self, ctx: &mut Context, time: f64) -> &Self {
        self.shared.stop(ctx, time);
        self
    }

    /// Invoke `method` on every generator matching `selector`. Returns the
    /// number of generators that had the method.
    pub fn call(&self, ctx: &mut Context, selector: &str, method: &str, call: MethodCall) -> usize {
        self.shared
            .db
            .find(selector)
            .iter()
            .filter(|ugen| ugen.call(ctx, method, call.clone()))
            .count()
    }

    /// The unity gain carrying the synth's output.
    pub fn outlet(&self) -> NodeId {
        self.shared.output
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.shared.params.get(name)
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.shared.params.keys().map(String::as_str).collect()
    }

    pub fn db(&self) -> &UGenDb {
        &self.shared.db
    }

    pub fn state(&self) -> SynthState {
        *self.shared.state.lock()
    }

    pub fn events(&self) -> &Receiver<UGenEvent> {
        &self.events
    }

    /// Notifications received so far.
    pub fn drain_events(&self) -> Vec<UGenEvent> {
        self.events.try_iter().collect()
    }
}

impl std::fmt::Debug for Synth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synth")
            .field("output", &self.shared.output)
            .field("ugens", &self.shared.db.len())
            .field("params", &self.param_names())
            .field("state", &self.state())
            .finish()
    }
}
