//! MotetEngine that owns the scheduling context and the ugen registry

use crate::core::{Context, Destination, EventId, Input};
use crate::ugen::{MethodCall, Spec, Synth, SynthDollar, UGenRegistry, UGenScope, Unit};
use crate::Result;
use parking_lot::Mutex;
use tracing::debug;

/// Shared handle over one [`Context`] and the registry synths are built
/// from.
///
/// Every method takes `&self`; the context sits behind a mutex so the engine
/// can be shared with the thread that drives [`process`](Self::process).
/// Callbacks run while that lock is held and receive the context directly,
/// so they must not call back into the engine.
///
/// # Example
///
/// ```ignore
/// use motet::prelude::*;
///
/// let engine = MotetEngine::builder().sample_rate(48000.0).build()?;
///
/// let synth = engine.synth(|dollar| {
///     let freq = dollar.call("@freq", Spec::new(), vec![Input::from(440.0)])?;
///     dollar.call("sin", spec! { "freq" => freq, "mul" => 0.2 }, vec![])
/// })?;
///
/// engine.start().play(&synth, 0.0);
///
/// // from the audio callback
/// engine.process(Some(playback_time));
/// ```
pub struct MotetEngine {
    context: Mutex<Context>,
    registry: UGenRegistry,
}

impl MotetEngine {
    /// Create a new engine builder
    pub fn builder() -> crate::MotetEngineBuilder {
        crate::MotetEngineBuilder::default()
    }

    pub fn sample_rate(&self) -> f64 {
        self.context.lock().sample_rate()
    }

    pub fn bpm(&self) -> f64 {
        self.context.lock().bpm()
    }

    /// Tempo used by relative time values. Clamped to a tiny positive floor.
    pub fn set_bpm(&self, bpm: f64) -> &Self {
        self.context.lock().set_bpm(bpm);
        self
    }

    pub fn current_time(&self) -> f64 {
        self.context.lock().current_time()
    }

    pub fn is_started(&self) -> bool {
        self.context.lock().is_started()
    }

    /// Access the context directly.
    ///
    /// # Example
    /// ```ignore
    /// let bus = engine.context(|ctx| ctx.audio_bus(1).node());
    /// ```
    pub fn context<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Context) -> R,
    {
        f(&mut self.context.lock())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start dispatching. Offline engines render their whole duration here.
    pub fn start(&self) -> &Self {
        self.context.lock().start();
        self
    }

    pub fn stop(&self) -> &Self {
        self.context.lock().stop();
        self
    }

    /// Drop every pending callback, tear down the buses and return to the
    /// unstarted state.
    pub fn reset(&self) -> &Self {
        self.context.lock().reset();
        self
    }

    /// One dispatch cycle. `None` falls back to the host clock.
    pub fn process(&self, playback_time: Option<f64>) {
        self.context.lock().process(playback_time);
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    pub fn sched<F>(&self, time: f64, callback: F) -> EventId
    where
        F: FnOnce(&mut Context, f64) + Send + 'static,
    {
        self.context.lock().sched(time, callback)
    }

    pub fn unsched(&self, id: EventId) -> EventId {
        self.context.lock().unsched(id)
    }

    pub fn next_tick<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&mut Context, f64) + Send + 'static,
    {
        self.context.lock().next_tick(callback);
        self
    }

    pub fn pending_events(&self) -> usize {
        self.context.lock().pending_events()
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Connect anything routable to audio bus `bus`.
    pub fn connect_bus(&self, from: impl Into<Input>, bus: i64) -> &Self {
        self.context.lock().connect(from, Destination::Bus(bus));
        self
    }

    pub fn disconnect(&self, from: impl Into<Input>) -> &Self {
        self.context.lock().disconnect(from);
        self
    }

    // =========================================================================
    // UGens
    // =========================================================================

    /// Register a ugen constructor for every synth built from now on.
    ///
    /// # Example
    /// ```ignore
    /// engine.register("dc", |_, spec, _| {
    ///     Ok(Unit::builder().outlet(spec.f64_or("value", 0.0)).build())
    /// })?;
    /// ```
    pub fn register<F>(&self, name: impl Into<String>, constructor: F) -> Result<&Self>
    where
        F: Fn(&mut UGenScope<'_>, &Spec, &[Input]) -> crate::ugen::Result<Unit>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(name, constructor)?;
        Ok(self)
    }

    pub fn registry(&self) -> &UGenRegistry {
        &self.registry
    }

    /// Build a synth definition against this engine's context and registry.
    pub fn synth<F>(&self, definition: F) -> Result<Synth>
    where
        F: FnOnce(&mut SynthDollar<'_>) -> crate::ugen::Result<Input>,
    {
        let mut ctx = self.context.lock();
        let synth = Synth::new(&mut ctx, &self.registry, definition)?;
        debug!(
            ugens = synth.db().len(),
            params = synth.param_names().len(),
            "Built synth"
        );
        Ok(synth)
    }

    /// Start `synth` at `time`.
    pub fn play(&self, synth: &Synth, time: f64) -> &Self {
        synth.start(&mut self.context.lock(), time);
        self
    }

    /// Stop `synth` at `time`.
    pub fn release(&self, synth: &Synth, time: f64) -> &Self {
        synth.stop(&mut self.context.lock(), time);
        self
    }

    /// Invoke `method` on the generators of `synth` matching `selector`.
    pub fn call(&self, synth: &Synth, selector: &str, method: &str, call: MethodCall) -> usize {
        synth.call(&mut self.context.lock(), selector, method, call)
    }

    /// Internal: create engine from builder
    pub(crate) fn from_parts(context: Context, registry: UGenRegistry) -> Self {
        Self {
            context: Mutex::new(context),
            registry,
        }
    }
}

impl std::fmt::Debug for MotetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotetEngine")
            .field("context", &*self.context.lock())
            .field("registry", &self.registry)
            .finish()
    }
}
