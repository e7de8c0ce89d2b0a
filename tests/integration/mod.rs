//! Integration test modules for motet
//!
//! - engine: builder validation, start/reset, offline rendering
//! - scheduler: logical clock and event dispatch
//! - graph: ugen outlets and routing
//! - synth: synth definitions end to end

pub mod engine;
pub mod graph;
pub mod scheduler;
pub mod synth;
