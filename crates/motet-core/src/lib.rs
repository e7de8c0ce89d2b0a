//! Scheduling kernel: logical audio clock, event queue, native node graph,
//! params and buses.
//!
//! # Primary API
//!
//! - [`Context`] / [`ContextBuilder`]: clock, `sched`/`unsched`/`next_tick`,
//!   dispatch, buses and routing
//! - [`Param`]: automatable scalar backed by a native control
//! - [`NodeGraph`]: in-process model of the native node graph
//! - [`time::to_seconds`]: time notation to absolute seconds
//! - [`Interval`] / [`Timeout`]: timers built on the event queue
//!
//! # Example
//!
//! ```ignore
//! use motet_core::prelude::*;
//!
//! let mut ctx = Context::builder().sample_rate(48000.0).build()?;
//! ctx.sched(0.5, |ctx, t| tracing::info!("half a second in: {t} / {}", ctx.current_time()));
//! ctx.start();
//!
//! // from the audio callback
//! ctx.process(Some(playback_time));
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod util;
pub mod time;
pub use time::{to_seconds, TimeValue};

mod clock;
pub use clock::{HostClock, ManualClock, SystemClock};

pub(crate) mod lockfree;
pub use lockfree::AtomicDouble;

pub mod native;
pub use native::{
    AutomationEvent, Control, ControlId, NodeGraph, NodeId, NodeKind, NodeSnapshot, Target,
};

mod config;
pub use config::{
    ContextBuilder, ContextConfig, RenderMode, AUDIO_BUS_CHANNELS, MAX_RENDERING_SEC, MIN_BPM,
    PROCESS_BUF_SIZE,
};

mod routing;
pub use routing::{Connectable, Destination, Input, Outlet};

mod param;
pub use param::{Curve, Param, ParamConfig};

mod bus;
pub use bus::AudioBus;

pub mod scheduler;
pub use scheduler::{EventCallback, EventId, TickCallback};

mod context;
pub use context::{Context, ContextState};

mod timer;
pub use timer::{Interval, Timeout, TimerTick};

pub mod prelude {
    //! Common imports.
    pub use crate::{
        Connectable, Context, ContextConfig, Curve, Destination, Input, Interval, NodeId, Outlet,
        Param, ParamConfig, RenderMode, TimeValue, Timeout,
    };
}
