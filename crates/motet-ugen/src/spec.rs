//! Generator specs: the keyed options passed alongside a key and inputs.

use crate::sequence::Sequence;
use crate::ugen::UGen;
use crate::watch::Watch;
use hashbrown::HashMap;
use motet_core::{Curve, Input, NodeId, Param, ParamConfig, TimeValue};
use std::fmt;
use std::sync::Arc;

/// Create a [`Spec`] from key-value pairs.
///
/// # Example
/// ```ignore
/// let spec = spec! {
///     "mul" => 0.5,
///     "curve" => "exp",
/// };
/// ```
#[macro_export]
macro_rules! spec {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut spec = $crate::Spec::new();
        $(
            spec.insert($key, $value);
        )*
        spec
    }};
}

/// Spec value types.
#[derive(Clone)]
pub enum SpecValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
    /// Anything routable: constant, node, param, list, generator.
    Input(Input),
    Sequence(Sequence),
    Object(Arc<dyn Watch>),
}

impl SpecValue {
    /// Convert to f64 if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Input(Input::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Routable view: numbers become constants, inputs pass through.
    pub fn as_input(&self) -> Option<Input> {
        match self {
            Self::Float(f) => Some(Input::Number(*f)),
            Self::Int(i) => Some(Input::Number(*i as f64)),
            Self::Input(input) => Some(input.clone()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn Watch>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Numbers are seconds, strings use time notation.
    pub fn as_time(&self) -> Option<TimeValue> {
        match self {
            Self::String(s) => Some(TimeValue::parse(s)),
            other => other.as_f64().map(TimeValue::Seconds),
        }
    }

    /// Name of the generator a non-textual key of this type builds.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) | Self::Int(_) | Self::Input(Input::Number(_)) => "number",
            Self::Bool(_) => "boolean",
            Self::String(_) => "string",
            Self::Input(Input::Null) => "null",
            Self::Input(Input::Node(_)) => "audionode",
            Self::Input(Input::Param(_)) => "param",
            Self::Input(Input::List(_)) => "array",
            Self::Input(Input::Signal(_)) => "ugen",
            Self::Sequence(_) => "iter",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Debug for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Input(v) => f.debug_tuple("Input").field(v).finish(),
            Self::Sequence(v) => f.debug_tuple("Sequence").field(v).finish(),
            Self::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl From<f64> for SpecValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for SpecValue {
    fn from(f: f32) -> Self {
        Self::Float(f as f64)
    }
}

impl From<i64> for SpecValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for SpecValue {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<bool> for SpecValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for SpecValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Input> for SpecValue {
    fn from(input: Input) -> Self {
        Self::Input(input)
    }
}

impl From<NodeId> for SpecValue {
    fn from(node: NodeId) -> Self {
        Self::Input(Input::Node(node))
    }
}

impl From<Param> for SpecValue {
    fn from(param: Param) -> Self {
        Self::Input(Input::Param(param))
    }
}

impl From<UGen> for SpecValue {
    fn from(ugen: UGen) -> Self {
        Self::Input(ugen.into())
    }
}

impl From<Sequence> for SpecValue {
    fn from(seq: Sequence) -> Self {
        Self::Sequence(seq)
    }
}

impl From<Arc<dyn Watch>> for SpecValue {
    fn from(obj: Arc<dyn Watch>) -> Self {
        Self::Object(obj)
    }
}

/// Keyed generator options. `mul` and `add` are recognized by every
/// generator; the rest are generator specific.
#[derive(Clone, Default)]
pub struct Spec {
    values: HashMap<String, SpecValue>,
}

impl Spec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SpecValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<SpecValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Get an optional value with a default.
    pub fn get_or<T>(&self, key: &str, default: T, convert: impl FnOnce(&SpecValue) -> Option<T>) -> T {
        self.values.get(key).and_then(convert).unwrap_or(default)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(SpecValue::as_f64)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.f64(key).unwrap_or(default)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SpecValue::as_str)
    }

    pub fn input(&self, key: &str) -> Option<Input> {
        self.get(key).and_then(SpecValue::as_input)
    }

    pub fn time(&self, key: &str) -> Option<TimeValue> {
        self.get(key).and_then(SpecValue::as_time)
    }

    /// Transition policy for params created from this spec: `curve`
    /// (`"step"`, `"lin"`, `"exp"`) and `lag` in seconds.
    pub fn param_config(&self) -> ParamConfig {
        let curve = self.str("curve").and_then(Curve::parse).unwrap_or_default();
        ParamConfig::new(curve, self.f64_or("lag", 0.0))
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}
