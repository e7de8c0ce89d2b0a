//! The `$` expression: builds the generators of one synth definition.
//!
//! Besides plain keys, `call` understands two prefixes:
//!
//! - `@name` declares a named param (the last input is its default value).
//!   The first declaration of a name wins; later ones return the same
//!   generator.
//! - `#id` refers to the generator with that id, whether it was built
//!   already or will be built later in the definition.

use super::db::UGenDb;
use super::promise::{PromiseState, UGenPromise};
use crate::error::{Result, UGenError};
use crate::sequence::Sequence;
use crate::spec::Spec;
use crate::ugen::{SynthHandle, UGen, UGenKey};
use hashbrown::HashMap;
use motet_core::util::finite;
use motet_core::{Context, Input, Param, TimeValue};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static PARAM_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]\w*$").unwrap());

/// Result of a `#id` lookup.
#[derive(Debug, Clone)]
pub enum Reference {
    UGen(UGen),
    Pending(UGenPromise),
}

impl From<Reference> for Input {
    fn from(reference: Reference) -> Self {
        match reference {
            Reference::UGen(ugen) => ugen.into(),
            Reference::Pending(promise) => promise.into(),
        }
    }
}

/// Everything a finished definition hands to its synth.
pub(crate) struct Definition {
    pub(crate) db: UGenDb,
    pub(crate) params: HashMap<String, Param>,
    pub(crate) stop_at: Option<TimeValue>,
}

pub struct SynthDollar<'a> {
    ctx: &'a mut Context,
    synth: &'a SynthHandle,
    db: UGenDb,
    promises: HashMap<String, UGenPromise>,
    params: HashMap<String, (Param, UGen)>,
    stop_at: Option<TimeValue>,
}

impl<'a> SynthDollar<'a> {
    pub(crate) fn new(ctx: &'a mut Context, synth: &'a SynthHandle) -> Self {
        Self {
            ctx,
            synth,
            db: UGenDb::new(),
            promises: HashMap::new(),
            params: HashMap::new(),
            stop_at: None,
        }
    }

    pub fn context(&mut self) -> &mut Context {
        self.ctx
    }

    pub fn db(&self) -> &UGenDb {
        &self.db
    }

    /// `$(key, spec, ...inputs)`, dispatching on `@` and `#` prefixes.
    ///
    /// # Example
    /// ```ignore
    /// let freq = dollar.call("@freq", Spec::new(), vec![Input::from(440.0)])?;
    /// let osc = dollar.call("sin", spec! { "freq" => freq }, vec![])?;
    /// ```
    pub fn call(
        &mut self,
        key: impl Into<UGenKey>,
        spec: Spec,
        mut inputs: Vec<Input>,
    ) -> Result<Input> {
        let key = key.into();
        if let UGenKey::Name(name) = &key {
            if let Some(name) = name.strip_prefix('@') {
                let default = inputs.pop().and_then(|input| input.as_number());
                return Ok(self.param(name, spec, default, &inputs)?.into());
            }
            if let Some(id) = name.strip_prefix('#') {
                return Ok(self.lookup(id).into());
            }
        }
        Ok(self.build(key, spec, &inputs)?.into())
    }

    /// Build a generator, resolve a forward reference to its id and record it.
    pub fn build(
        &mut self,
        key: impl Into<UGenKey>,
        spec: Spec,
        inputs: &[Input],
    ) -> Result<UGen> {
        let ugen = UGen::build(self.synth, self.ctx, key, spec, inputs)?;
        if let Some(promise) = ugen.id().and_then(|id| self.promises.remove(id)) {
            promise.resolve(self.ctx, &ugen)?;
        }
        self.db.append(ugen.clone());
        Ok(ugen)
    }

    /// Declare (or fetch) the param `name`.
    ///
    /// Without inputs the generator emits the param. With inputs it emits
    /// their sum scaled by the param.
    pub fn param(
        &mut self,
        name: &str,
        spec: Spec,
        default: Option<f64>,
        inputs: &[Input],
    ) -> Result<UGen> {
        if let Some((_, ugen)) = self.params.get(name) {
            return Ok(ugen.clone());
        }
        if !PARAM_NAME.is_match(name) {
            return Err(UGenError::InvalidParamName(name.to_string()));
        }

        let default = finite(default.unwrap_or(0.0));
        let param = Param::new(self.ctx, default, spec.param_config());

        let ugen = if inputs.is_empty() {
            UGen::build(self.synth, self.ctx, "+", spec, &[Input::from(&param)])?
        } else {
            let sum = UGen::build(
                self.synth,
                self.ctx,
                "+",
                spec,
                &[Input::List(inputs.to_vec())],
            )?;
            let scale = Spec::new().with("mul", param.clone());
            UGen::build(self.synth, self.ctx, "+", scale, &[sum.into()])?
        };

        self.params
            .insert(name.to_string(), (param, ugen.clone()));
        Ok(ugen)
    }

    /// The generator with `id`: an outstanding forward reference, an already
    /// built generator, or a new forward reference.
    pub fn lookup(&mut self, id: &str) -> Reference {
        if let Some(promise) = self.promises.get(id) {
            return Reference::Pending(promise.clone());
        }
        if let Some(ugen) = self.db.find_by_id(id) {
            return Reference::UGen(ugen);
        }
        let promise = UGenPromise::new(id);
        self.promises.insert(id.to_string(), promise.clone());
        Reference::Pending(promise)
    }

    /// A sequence yielding `value` forever.
    pub fn interval(value: f64) -> Sequence {
        Sequence::repeat(value)
    }

    /// `value` once, then the sequence ends.
    pub fn timeout(value: f64) -> Sequence {
        Sequence::once(value)
    }

    /// Stop the synth at `time` (seconds or time notation).
    pub fn stop_at(&mut self, time: impl Into<TimeValue>) {
        self.stop_at = Some(time.into());
    }

    pub(crate) fn finish(self) -> Definition {
        for (id, promise) in &self.promises {
            if promise.state() == PromiseState::Pending {
                warn!(id = %id, "Forward reference never resolved");
            }
        }
        Definition {
            db: self.db,
            params: self
                .params
                .into_iter()
                .map(|(name, (param, _))| (name, param))
                .collect(),
            stop_at: self.stop_at,
        }
    }
}
