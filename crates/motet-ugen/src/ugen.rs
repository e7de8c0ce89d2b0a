//! Built generators.
//!
//! A [`UGen`] is the result of running a registered constructor: the unit it
//! returned, the materialized outlet and any generators the constructor
//! built for itself. UGens are cheap to clone and connect like any other
//! [`Input`].

use crate::error::{Result, UGenError};
use crate::outlet::make_outlet;
use crate::registry::UGenRegistry;
use crate::selector::{self, Selector};
use crate::sequence::Sequence;
use crate::spec::{Spec, SpecValue};
use crate::unit::{MethodCall, Unit};
use crate::watch::Watch;
use crossbeam_channel::{unbounded, Receiver, Sender};
use motet_core::{Connectable, Context, ControlId, Destination, Input, NodeId, Outlet};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Notifications emitted by running generators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UGenEvent {
    /// A generator ran out of values.
    End {
        key: String,
        id: Option<String>,
        playback_time: f64,
    },
}

/// Sending half of a generator's notifications.
#[derive(Clone)]
pub struct UGenEmitter {
    key: String,
    id: Option<String>,
    sender: Sender<UGenEvent>,
}

impl UGenEmitter {
    fn new(selector: &Selector, sender: Sender<UGenEvent>) -> Self {
        Self {
            key: selector.key.clone(),
            id: selector.id.clone(),
            sender,
        }
    }

    pub fn end(&self, playback_time: f64) {
        let event = UGenEvent::End {
            key: self.key.clone(),
            id: self.id.clone(),
            playback_time,
        };
        if self.sender.send(event).is_err() {
            trace!(key = %self.key, "End notification dropped, synth is gone");
        }
    }
}

impl fmt::Debug for UGenEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UGenEmitter")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

/// What a generator is built against: the registry to resolve keys in and
/// the channel its notifications go to.
#[derive(Clone)]
pub struct SynthHandle {
    registry: UGenRegistry,
    sender: Sender<UGenEvent>,
}

impl SynthHandle {
    pub fn new(registry: UGenRegistry) -> (Self, Receiver<UGenEvent>) {
        let (sender, receiver) = unbounded();
        (Self { registry, sender }, receiver)
    }

    pub fn registry(&self) -> &UGenRegistry {
        &self.registry
    }
}

impl fmt::Debug for SynthHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthHandle")
            .field("registry", &self.registry)
            .finish()
    }
}

/// The first argument of a build: a textual key, or a value whose type
/// selects the generator.
#[derive(Debug, Clone)]
pub enum UGenKey {
    Name(String),
    Value(SpecValue),
}

impl From<&str> for UGenKey {
    fn from(name: &str) -> Self {
        UGenKey::Name(name.to_string())
    }
}

impl From<String> for UGenKey {
    fn from(name: String) -> Self {
        UGenKey::Name(name)
    }
}

impl From<f64> for UGenKey {
    fn from(value: f64) -> Self {
        UGenKey::Value(SpecValue::Float(value))
    }
}

impl From<Sequence> for UGenKey {
    fn from(sequence: Sequence) -> Self {
        UGenKey::Value(SpecValue::Sequence(sequence))
    }
}

impl From<NodeId> for UGenKey {
    fn from(node: NodeId) -> Self {
        UGenKey::Value(SpecValue::Input(Input::Node(node)))
    }
}

impl From<Arc<dyn Watch>> for UGenKey {
    fn from(target: Arc<dyn Watch>) -> Self {
        UGenKey::Value(SpecValue::Object(target))
    }
}

impl From<SpecValue> for UGenKey {
    fn from(value: SpecValue) -> Self {
        match value {
            SpecValue::String(name) => UGenKey::Name(name),
            other => UGenKey::Value(other),
        }
    }
}

/// Handed to constructors while they run.
pub struct UGenScope<'a> {
    ctx: &'a mut Context,
    synth: &'a SynthHandle,
    selector: &'a Selector,
    emitter: UGenEmitter,
    children: Vec<UGen>,
}

impl<'a> UGenScope<'a> {
    pub fn ctx(&mut self) -> &mut Context {
        self.ctx
    }

    pub fn selector(&self) -> &Selector {
        self.selector
    }

    pub fn emitter(&self) -> UGenEmitter {
        self.emitter.clone()
    }

    /// Build a generator owned by the one under construction. It is started
    /// and stopped together with its owner.
    pub fn build(
        &mut self,
        key: impl Into<UGenKey>,
        spec: Spec,
        inputs: &[Input],
    ) -> Result<UGen> {
        let ugen = UGen::build(self.synth, self.ctx, key, spec, inputs)?;
        self.children.push(ugen.clone());
        Ok(ugen)
    }

    /// Drive a native control from a spec value. Numbers set the value,
    /// signals connect into it, sequences and watch targets are wrapped in
    /// `iter` and `object` generators first. Other values leave the control
    /// untouched.
    pub fn connect_control(&mut self, value: &SpecValue, control: ControlId) -> Result<()> {
        match value {
            SpecValue::Sequence(_) | SpecValue::Object(_) => {
                let ugen = self.build(value.clone(), Spec::new(), &[])?;
                self.ctx.connect(ugen, control);
            }
            other => {
                if let Some(input) = other.as_input() {
                    self.ctx.connect(input, control);
                }
            }
        }
        Ok(())
    }
}

struct UGenInner {
    selector: Selector,
    unit: Unit,
    outlet: Outlet,
    children: Vec<UGen>,
    // constant source carrying `outlet.offset`, created on first connect
    offset_node: Mutex<Option<NodeId>>,
    synth: SynthHandle,
}

#[derive(Clone)]
pub struct UGen {
    inner: Arc<UGenInner>,
}

impl UGen {
    /// Resolve `key`, run its constructor and materialize the outlet.
    pub fn build(
        synth: &SynthHandle,
        ctx: &mut Context,
        key: impl Into<UGenKey>,
        mut spec: Spec,
        inputs: &[Input],
    ) -> Result<UGen> {
        let key = match key.into() {
            UGenKey::Name(name) => name,
            UGenKey::Value(value) => {
                let name = value.type_name().to_string();
                spec.insert("value", value);
                name
            }
        };

        let selector = selector::parse(&key)?;
        let constructor = synth
            .registry
            .get(&selector.key)
            .ok_or_else(|| UGenError::UnknownKey(selector.key.clone()))?;

        let mut scope = UGenScope {
            ctx: &mut *ctx,
            synth,
            selector: &selector,
            emitter: UGenEmitter::new(&selector, synth.sender.clone()),
            children: Vec::new(),
        };
        let unit = constructor(&mut scope, &spec, inputs)?;
        let children = scope.children;

        if unit.outlet.is_none() {
            return Err(UGenError::MalformedUnit(key));
        }
        let outlet = make_outlet(ctx, &unit, &spec);
        debug!(key = %key, node = ?outlet.node, offset = outlet.offset, "Built ugen");

        Ok(UGen {
            inner: Arc::new(UGenInner {
                selector,
                unit,
                outlet,
                children,
                offset_node: Mutex::new(None),
                synth: synth.clone(),
            }),
        })
    }

    pub fn key(&self) -> &str {
        &self.inner.selector.key
    }

    pub fn class(&self) -> Option<&str> {
        self.inner.selector.class.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.inner.selector.id.as_deref()
    }

    pub fn selector(&self) -> &Selector {
        &self.inner.selector
    }

    pub fn unit(&self) -> &Unit {
        &self.inner.unit
    }

    pub fn outlet(&self) -> Outlet {
        self.inner.outlet
    }

    /// `self + other`. A null operand counts as zero.
    pub fn add(&self, ctx: &mut Context, other: impl Into<Input>) -> Result<UGen> {
        let other = match other.into() {
            Input::Null => Input::Number(0.0),
            other => other,
        };
        let inputs = [Input::from(self.clone()), other];
        UGen::build(&self.inner.synth, ctx, "+", Spec::new(), &inputs)
    }

    /// `self * other`. A null operand counts as one.
    pub fn mul(&self, ctx: &mut Context, other: impl Into<Input>) -> Result<UGen> {
        let other = match other.into() {
            Input::Null => Input::Number(1.0),
            other => other,
        };
        let inputs = [Input::from(self.clone()), other];
        UGen::build(&self.inner.synth, ctx, "*", Spec::new(), &inputs)
    }

    /// `self * mul + add`.
    pub fn madd(
        &self,
        ctx: &mut Context,
        mul: impl Into<Input>,
        add: impl Into<Input>,
    ) -> Result<UGen> {
        self.mul(ctx, mul)?.add(ctx, add)
    }

    /// Invoke a unit method. Returns `false` when the unit has no such method.
    pub fn call(&self, ctx: &mut Context, name: &str, call: MethodCall) -> bool {
        let method = self.inner.unit.methods.get(name).cloned();
        match method {
            Some(method) => {
                method(ctx, call);
                true
            }
            None => false,
        }
    }

    /// Run the start hooks, owned generators first.
    pub fn start(&self, ctx: &mut Context, playback_time: f64) {
        for child in &self.inner.children {
            child.start(ctx, playback_time);
        }
        if let Some(hook) = self.inner.unit.start.clone() {
            hook(ctx, playback_time);
        }
    }

    pub fn stop(&self, ctx: &mut Context, playback_time: f64) {
        for child in &self.inner.children {
            child.stop(ctx, playback_time);
        }
        if let Some(hook) = self.inner.unit.stop.clone() {
            hook(ctx, playback_time);
        }
    }

    fn offset_node(&self, ctx: &mut Context) -> Option<NodeId> {
        let offset = self.inner.outlet.offset;
        if offset == 0.0 {
            return None;
        }
        let mut slot = self.inner.offset_node.lock();
        let node = slot.get_or_insert_with(|| ctx.graph_mut().create_constant(offset));
        Some(*node)
    }
}

impl Connectable for UGen {
    fn outlet(&self, _ctx: &mut Context) -> Outlet {
        self.inner.outlet
    }

    fn connect_to(&self, ctx: &mut Context, to: Destination) {
        if let Some(node) = self.inner.outlet.node {
            ctx.connect_node(node, to);
        }
        if let Some(dc) = self.offset_node(ctx) {
            ctx.connect_node(dc, to);
        }
    }

    fn disconnect_from(&self, ctx: &mut Context) {
        if let Some(node) = self.inner.outlet.node {
            ctx.disconnect_node(node);
        }
        let dc = *self.inner.offset_node.lock();
        if let Some(dc) = dc {
            ctx.disconnect_node(dc);
        }
    }
}

impl From<UGen> for Input {
    fn from(ugen: UGen) -> Self {
        Input::Signal(Arc::new(ugen))
    }
}

impl From<&UGen> for Input {
    fn from(ugen: &UGen) -> Self {
        Input::Signal(Arc::new(ugen.clone()))
    }
}

impl fmt::Debug for UGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UGen")
            .field("selector", &self.inner.selector)
            .field("outlet", &self.inner.outlet)
            .field("children", &self.inner.children.len())
            .finish()
    }
}
