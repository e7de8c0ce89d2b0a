//! Builder for configuring and constructing a `MotetEngine`.

use crate::core::{Context, ContextConfig, HostClock, RenderMode};
use crate::ugen::UGenRegistry;
use crate::{MotetEngine, Result};
use tracing::debug;

/// Live engines are driven by the host calling `process` once per buffer.
/// Offline engines render their whole duration in a single dispatch cycle
/// when started.
///
/// # Example
///
/// ```ignore
/// use motet::prelude::*;
///
/// let engine = MotetEngine::builder()
///     .sample_rate(48000.0)
///     .buffer_size(512)
///     .bpm(96.0)
///     .build()?;
/// ```
#[derive(Default)]
pub struct MotetEngineBuilder {
    config: ContextConfig,
    registry: Option<UGenRegistry>,
    clock: Option<Box<dyn HostClock>>,
}

impl MotetEngineBuilder {
    /// Default: 44100
    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Frames per live dispatch cycle. Default: 1024
    pub fn buffer_size(mut self, frames: usize) -> Self {
        self.config.buffer_size = frames;
        self
    }

    /// Default: 120
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.bpm = bpm;
        self
    }

    /// Render `duration` seconds in one cycle when the engine starts.
    pub fn offline(mut self, duration: f64) -> Self {
        self.config.mode = RenderMode::Offline { duration };
        self
    }

    pub fn config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a registry with other engines. Defaults to the built-in ugens.
    pub fn registry(mut self, registry: UGenRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Host clock used when `process` is called without a playback time.
    pub fn clock(mut self, clock: impl HostClock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> Result<MotetEngine> {
        let context = match self.clock {
            Some(clock) => Context::with_clock(self.config, clock)?,
            None => Context::new(self.config)?,
        };
        let registry = self.registry.unwrap_or_default();

        debug!(
            sample_rate = context.sample_rate(),
            ugens = registry.list_types().len(),
            "Built engine"
        );
        Ok(MotetEngine::from_parts(context, registry))
    }
}
