//! Unit generator graph builder on top of `motet-core`.
//!
//! # Primary API
//!
//! - [`UGenRegistry`]: named constructors, with the built-in generators in
//!   `UGenRegistry::default()`
//! - [`UGen`]: a built generator with its materialized outlet
//! - [`Synth`] / [`SynthDollar`]: the `$` builder for one synth definition
//! - [`Spec`] / [`spec!`]: options passed to constructors
//!
//! # Example
//!
//! ```ignore
//! use motet_ugen::prelude::*;
//!
//! let registry = UGenRegistry::default();
//! let synth = Synth::new(&mut ctx, &registry, |dollar| {
//!     let freq = dollar.call("@freq", Spec::new(), vec![Input::from(440.0)])?;
//!     dollar.call("sin", spec! { "freq" => freq, "mul" => 0.25 }, vec![])
//! })?;
//! synth.start(&mut ctx, ctx.current_time());
//! ```

pub mod error;
pub use error::{Result, UGenError};

pub mod selector;
pub use selector::{Query, Selector};

mod sequence;
pub use sequence::{Sequence, Step};

mod watch;
pub use watch::{Watch, WatchedFields};

pub mod spec;
pub use spec::{Spec, SpecValue};

mod unit;
pub use unit::{MethodCall, Unit, UnitBuilder, UnitHook, UnitMethod};

pub mod outlet;

mod registry;
pub use registry::{UGenConstructor, UGenRegistry};

mod ugen;
pub use ugen::{SynthHandle, UGen, UGenEmitter, UGenEvent, UGenKey, UGenScope};

mod builtin;

pub mod synth;
pub use synth::{PromiseState, Reference, Synth, SynthDollar, SynthState, UGenDb, UGenPromise};

pub mod prelude {
    //! Common imports.
    pub use crate::{
        spec, MethodCall, Sequence, Spec, SpecValue, Synth, SynthDollar, UGen, UGenEvent,
        UGenRegistry, UGenScope, Unit,
    };
    pub use motet_core::prelude::*;
}
