//! The scheduling context: logical audio clock, event queue, buses and
//! routing.
//!
//! A [`Context`] turns the host's periodic process calls into a monotonic
//! logical clock. Each cycle it first drains the callbacks queued with
//! [`Context::next_tick`], then runs every scheduled event due before the end
//! of the buffer, in time order.
//!
//! ```ignore
//! let mut ctx = Context::new(ContextConfig::default())?;
//! ctx.sched(0.05, |ctx, t| println!("fired at {t}, clock {}", ctx.current_time()));
//! ctx.start();
//! ctx.process(Some(0.0));
//! ```

use crate::bus::AudioBus;
use crate::clock::{HostClock, SystemClock};
use crate::config::{
    ContextBuilder, ContextConfig, RenderMode, AUDIO_BUS_CHANNELS, MAX_RENDERING_SEC, MIN_BPM,
};
use crate::native::{NodeGraph, NodeId, Target};
use crate::routing::{Destination, Input, Outlet};
use crate::scheduler::{EventCallback, EventId, EventQueue, TickCallback};
use crate::time::{self, TimeValue};
use crate::util::{clip, finite, int};
use crate::Result;
use hashbrown::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};

/// Lifecycle of a context. `reset` returns to `Init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Init,
    Start,
}

pub struct Context {
    config: ContextConfig,
    graph: NodeGraph,
    analyser: NodeId,
    clock: Box<dyn HostClock>,
    state: ContextState,
    current_time: f64,
    increment: f64,
    bpm: f64,
    events: EventQueue,
    next_ticks: Vec<TickCallback>,
    buses: HashMap<usize, AudioBus>,
}

impl Context {
    /// Create a context driven by the system clock.
    pub fn new(config: ContextConfig) -> Result<Self> {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: ContextConfig, clock: Box<dyn HostClock>) -> Result<Self> {
        config.validate()?;

        let mut graph = NodeGraph::new();
        let analyser = graph.create_analyser();
        graph.connect(analyser, Target::Node(graph.destination()));

        Ok(Self {
            bpm: config.bpm,
            config,
            graph,
            analyser,
            clock,
            state: ContextState::Init,
            current_time: 0.0,
            increment: 0.0,
            events: EventQueue::new(),
            next_ticks: Vec::new(),
            buses: HashMap::new(),
        })
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state == ContextState::Start
    }

    /// Seconds covered by one dispatch cycle (0 until started).
    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// The logical clock, or the host clock while nothing has been dispatched.
    pub fn current_time(&self) -> f64 {
        if self.current_time != 0.0 {
            self.current_time
        } else {
            self.clock.now()
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = finite(bpm).max(MIN_BPM);
    }

    /// Convert a time value to absolute seconds at the current tempo.
    pub fn to_seconds(&self, value: &TimeValue) -> f64 {
        time::to_seconds(value, self.bpm, self.config.sample_rate, self.current_time())
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    pub fn destination(&self) -> NodeId {
        self.graph.destination()
    }

    pub fn analyser(&self) -> NodeId {
        self.analyser
    }

    // --- scheduling ---

    /// Run `callback` once at `time` (seconds, non-finite treated as 0).
    pub fn sched<F>(&mut self, time: f64, callback: F) -> EventId
    where
        F: FnOnce(&mut Context, f64) + Send + 'static,
    {
        self.events.push(finite(time), Box::new(callback))
    }

    /// Like [`sched`](Self::sched) for an optional callback. Schedules
    /// nothing and returns [`EventId::NONE`] when there is no callback.
    pub fn sched_callback(&mut self, time: f64, callback: Option<EventCallback>) -> EventId {
        match callback {
            Some(callback) => self.events.push(finite(time), callback),
            None => EventId::NONE,
        }
    }

    /// Cancel a pending event. Idempotent; returns `id` unchanged.
    pub fn unsched(&mut self, id: EventId) -> EventId {
        if !id.is_none() {
            self.events.remove(id);
        }
        id
    }

    pub fn is_scheduled(&self, id: EventId) -> bool {
        self.events.contains(id)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Run `callback` at the start of the next dispatch cycle, before any
    /// due event. It receives that cycle's playback time.
    pub fn next_tick<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut Context, f64) + Send + 'static,
    {
        self.next_ticks.push(Box::new(callback));
        self
    }

    // --- lifecycle ---

    pub fn start(&mut self) -> &mut Self {
        if self.state != ContextState::Init {
            return self;
        }
        self.state = ContextState::Start;

        let bus = self.audio_bus(0).node();
        self.graph.connect(bus, Target::Node(self.analyser));

        match self.config.mode {
            RenderMode::Offline { duration } => {
                self.increment = clip(finite(duration), 0.0, MAX_RENDERING_SEC);
                debug!("Context started offline, rendering {:.3}s", self.increment);
                self.process(Some(0.0));
            }
            RenderMode::Live => {
                self.increment = self.config.buffer_duration();
                debug!(
                    "Context started live, {} frames per cycle ({:.4}s)",
                    self.config.buffer_size, self.increment
                );
            }
        }
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self
    }

    /// Tear down buses, free every node except the destination and the
    /// analyser, drop every pending callback and return to `Init`.
    pub fn reset(&mut self) -> &mut Self {
        for (_, bus) in self.buses.drain() {
            self.graph.disconnect(bus.node());
        }
        let freed = self.graph.retain(&[self.analyser]);
        self.events.clear();
        self.next_ticks.clear();
        self.state = ContextState::Init;
        self.current_time = 0.0;
        self.increment = 0.0;
        debug!("Context reset, {} nodes freed", freed);
        self
    }

    /// One dispatch cycle. Call once per audio buffer with the buffer's
    /// playback time; `None` falls back to the host clock.
    pub fn process(&mut self, playback_time: Option<f64>) {
        if self.state != ContextState::Start {
            return;
        }

        let mut playback_time = match playback_time {
            Some(t) if t.is_finite() => t,
            _ => self.clock.now(),
        };
        if playback_time < self.current_time {
            warn!(
                "Host playback time {:.6}s is behind the clock ({:.6}s), holding",
                playback_time, self.current_time
            );
            playback_time = self.current_time;
        }

        let next_boundary = playback_time + self.increment;
        self.current_time = playback_time;

        let ticks = std::mem::take(&mut self.next_ticks);
        let tick_count = ticks.len();
        for callback in ticks {
            callback(self, playback_time);
        }

        let mut dispatched = 0usize;
        while let Some(event) = self.events.pop_due(next_boundary) {
            self.current_time = self.current_time.max(event.time);
            (event.callback)(self, event.time);
            dispatched += 1;
        }
        self.graph.prune_automation(self.current_time);

        trace!(
            "cycle at {:.6}s: {} ticks, {} events, {} pending",
            playback_time,
            tick_count,
            dispatched,
            self.events.len()
        );
    }

    // --- buses ---

    /// The bus at `index`, clamped into `[0, AUDIO_BUS_CHANNELS]` and created
    /// on first use.
    pub fn audio_bus(&mut self, index: i64) -> &mut AudioBus {
        let index = index.clamp(0, AUDIO_BUS_CHANNELS) as usize;
        let graph = &mut self.graph;
        self.buses
            .entry(index)
            .or_insert_with(|| AudioBus::new(index, graph.create_gain(1.0)))
    }

    /// Like [`audio_bus`](Self::audio_bus) for a float index.
    pub fn audio_bus_at(&mut self, index: f64) -> &mut AudioBus {
        self.audio_bus(int(index))
    }

    /// An existing bus, without creating it.
    pub fn bus(&self, index: usize) -> Option<&AudioBus> {
        self.buses.get(&index)
    }

    // --- routing ---

    /// Wire `from` into `to`.
    ///
    /// Lists are summed first, numbers into a control set its value, signals
    /// wire themselves and anything else is converted with
    /// [`to_node`](Self::to_node). Unconvertible input is a no-op.
    pub fn connect(&mut self, from: impl Into<Input>, to: impl Into<Destination>) -> &mut Self {
        let to = to.into();
        match from.into() {
            Input::Null => {}
            Input::List(items) => {
                if !items.is_empty() {
                    let outlet = Input::List(items).outlet(self);
                    self.connect_outlet(outlet, to);
                }
            }
            Input::Signal(signal) => signal.connect_to(self, to),
            Input::Number(value) => match to {
                Destination::Control(control) => {
                    if let Some(control) = self.graph.control_mut(control) {
                        control.set_value(finite(value));
                    }
                }
                _ => {
                    let node = self.graph.create_constant(finite(value));
                    self.wire(node, to);
                }
            },
            other => {
                if let Some(node) = self.to_node(&other) {
                    self.wire(node, to);
                }
            }
        }
        self
    }

    /// Wire an outlet: its node, plus a constant source carrying the offset
    /// when the offset is non-zero.
    pub fn connect_outlet(&mut self, outlet: Outlet, to: Destination) {
        if let Some(node) = outlet.node {
            self.wire(node, to);
        }
        if outlet.offset != 0.0 {
            let dc = self.graph.create_constant(outlet.offset);
            self.wire(dc, to);
        }
    }

    /// Wire a single node, notifying the bus it lands on.
    pub fn connect_node(&mut self, from: NodeId, to: Destination) {
        self.wire(from, to);
    }

    fn wire(&mut self, from: NodeId, to: Destination) {
        let target = match to {
            Destination::Node(id) => Target::Node(id),
            Destination::Control(id) => Target::Control(id),
            Destination::Bus(index) => Target::Node(self.audio_bus(index).node()),
        };
        self.graph.connect(from, target);

        if let Target::Node(id) = target {
            for bus in self.buses.values_mut().filter(|bus| bus.node() == id) {
                bus.on_connected(from);
            }
        }
    }

    /// Remove every outgoing connection of `from`. Safe on null and on
    /// already-disconnected values.
    pub fn disconnect(&mut self, from: impl Into<Input>) -> &mut Self {
        match from.into() {
            Input::Null | Input::Number(_) => {}
            Input::Node(node) => self.disconnect_node(node),
            Input::Param(param) => self.disconnect_node(param.node()),
            Input::List(items) => {
                for item in items {
                    self.disconnect(item);
                }
            }
            Input::Signal(signal) => signal.disconnect_from(self),
        }
        self
    }

    /// Disconnect a single node and notify the buses it was feeding.
    pub fn disconnect_node(&mut self, node: NodeId) {
        for target in self.graph.disconnect(node) {
            if let Target::Node(id) = target {
                for bus in self.buses.values_mut().filter(|bus| bus.node() == id) {
                    bus.on_disconnected(node);
                }
            }
        }
    }

    /// Convert an input into a single connectable node.
    ///
    /// Numbers become constant sources; outlets with both a node and an
    /// offset are summed. Returns `None` for null or silent input.
    pub fn to_node(&mut self, input: &Input) -> Option<NodeId> {
        match input {
            Input::Null => None,
            Input::Number(value) => Some(self.graph.create_constant(finite(*value))),
            Input::Node(node) => Some(*node),
            Input::Param(param) => Some(param.node()),
            Input::List(_) | Input::Signal(_) => {
                let outlet = input.outlet(self);
                self.outlet_to_node(outlet)
            }
        }
    }

    /// Collapse an outlet into one node.
    pub fn outlet_to_node(&mut self, outlet: Outlet) -> Option<NodeId> {
        match (outlet.node, outlet.offset) {
            (Some(node), offset) if offset == 0.0 => Some(node),
            (Some(node), offset) => {
                let dc = self.graph.create_constant(offset);
                Some(self.create_sum(&[node, dc]))
            }
            (None, offset) if offset != 0.0 => Some(self.graph.create_constant(offset)),
            (None, _) => None,
        }
    }

    /// A unity gain node summing `nodes`.
    pub fn create_sum(&mut self, nodes: &[NodeId]) -> NodeId {
        let sum = self.graph.create_gain(1.0);
        for node in nodes {
            self.graph.connect(*node, Target::Node(sum));
        }
        sum
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("state", &self.state)
            .field("current_time", &self.current_time)
            .field("increment", &self.increment)
            .field("bpm", &self.bpm)
            .field("pending_events", &self.events.len())
            .field("nodes", &self.graph.len())
            .finish_non_exhaustive()
    }
}
