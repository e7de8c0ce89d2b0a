//! # Motet - Sample-Synchronized Scheduling and UGen Graphs
//!
//! Schedules callbacks against a logical audio clock and builds unit
//! generator graphs from declarative synth definitions.
//!
//! ## Architecture
//!
//! Motet is an umbrella crate that coordinates:
//! - **motet-core** - Logical clock, event queue, native node graph, params, buses
//! - **motet-ugen** - UGen registry, mul/add outlets, the `$` builder, control-rate generators
//!
//! ## Quick Start
//!
//! ```ignore
//! use motet::prelude::*;
//!
//! let engine = MotetEngine::builder().sample_rate(44100.0).build()?;
//!
//! // Build a synth: one declared param feeding an oscillator
//! let synth = engine.synth(|dollar| {
//!     let freq = dollar.call("@freq", Spec::new(), vec![Input::from(440.0)])?;
//!     dollar.call("sin", spec! { "freq" => freq, "mul" => 0.25 }, vec![])
//! })?;
//!
//! // Schedule and run
//! engine.start().play(&synth, 0.0);
//! engine.sched(1.0, |ctx, t| tracing::info!("one second in: {t} / {}", ctx.current_time()));
//! engine.process(Some(0.0));
//! ```

/// Re-export of motet-core for direct access
pub use motet_core as core;

/// Re-export of motet-ugen for direct access
pub use motet_ugen as ugen;

// Core types
pub use motet_core::{
    Connectable, Context, ContextConfig, Curve, Destination, EventId, HostClock, Input, Interval,
    ManualClock, NodeId, Outlet, Param, ParamConfig, RenderMode, TimeValue, Timeout,
};

// UGen types
pub use motet_ugen::{
    spec, MethodCall, Sequence, Spec, SpecValue, Synth, SynthDollar, SynthState, UGen, UGenEvent,
    UGenRegistry, UGenScope, Unit,
};

mod builder;
mod engine;
mod error;

pub use builder::MotetEngineBuilder;
pub use engine::MotetEngine;
pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Error, EventId, ManualClock, MotetEngine, MotetEngineBuilder, Result};

    pub use motet_core::prelude::*;
    pub use motet_ugen::prelude::*;
}
