//! Unit descriptors: what a generator constructor hands back.

use crate::spec::SpecValue;
use hashbrown::HashMap;
use motet_core::{Context, Input};
use std::fmt;
use std::sync::Arc;

/// Start/stop hook. Receives the time it was scheduled for.
pub type UnitHook = Arc<dyn Fn(&mut Context, f64) + Send + Sync>;

/// A named method exposed by a unit (`setValue`, `next`, ...).
pub type UnitMethod = Arc<dyn Fn(&mut Context, MethodCall) + Send + Sync>;

/// Arguments of a unit method call.
#[derive(Debug, Clone, Default)]
pub struct MethodCall {
    pub playback_time: f64,
    pub value: Option<SpecValue>,
}

impl MethodCall {
    pub fn at(playback_time: f64) -> Self {
        Self {
            playback_time,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<SpecValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// The subgraph a constructor built, plus its lifecycle hooks.
///
/// A unit without an outlet is rejected at build time. A silent unit uses
/// `Input::Null` as its outlet.
#[derive(Clone, Default)]
pub struct Unit {
    pub(crate) outlet: Option<Input>,
    pub(crate) offset: f64,
    pub(crate) start: Option<UnitHook>,
    pub(crate) stop: Option<UnitHook>,
    pub(crate) methods: HashMap<String, UnitMethod>,
}

impl Unit {
    pub fn builder() -> UnitBuilder {
        UnitBuilder::default()
    }

    pub fn outlet(&self) -> Option<&Input> {
        self.outlet.as_ref()
    }

    /// Constant added on top of the outlet.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("outlet", &self.outlet)
            .field("offset", &self.offset)
            .field("start", &self.start.is_some())
            .field("stop", &self.stop.is_some())
            .field("methods", &self.method_names())
            .finish()
    }
}

#[derive(Default)]
pub struct UnitBuilder {
    unit: Unit,
}

impl UnitBuilder {
    pub fn outlet(mut self, outlet: impl Into<Input>) -> Self {
        self.unit.outlet = Some(outlet.into());
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.unit.offset = offset;
        self
    }

    pub fn start<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context, f64) + Send + Sync + 'static,
    {
        self.unit.start = Some(Arc::new(hook));
        self
    }

    pub fn stop<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context, f64) + Send + Sync + 'static,
    {
        self.unit.stop = Some(Arc::new(hook));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Context, MethodCall) + Send + Sync + 'static,
    {
        self.unit.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn build(self) -> Unit {
        self.unit
    }
}
