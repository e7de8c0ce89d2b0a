//! Context configuration.

use crate::clock::HostClock;
use crate::context::Context;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default audio buffer length in frames.
pub const PROCESS_BUF_SIZE: usize = 1024;

/// Highest audio bus index.
pub const AUDIO_BUS_CHANNELS: i64 = 16;

/// Upper bound of a single offline render, in seconds.
pub const MAX_RENDERING_SEC: f64 = 180.0;

/// Lowest tempo the context accepts through its setter.
pub const MIN_BPM: f64 = 1e-6;

/// How the context is driven.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// The host calls [`Context::process`] once per audio buffer.
    #[default]
    Live,
    /// One dispatch cycle covering `duration` seconds runs when the context
    /// starts.
    Offline { duration: f64 },
}

/// Configuration for a [`Context`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub sample_rate: f64,
    pub buffer_size: usize,
    pub bpm: f64,
    pub mode: RenderMode,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            buffer_size: PROCESS_BUF_SIZE,
            bpm: 120.0,
            mode: RenderMode::Live,
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} must be positive and finite",
                self.sample_rate
            )));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer_size must be non-zero".into()));
        }
        if !self.bpm.is_finite() || self.bpm < MIN_BPM {
            return Err(Error::InvalidTempo(self.bpm));
        }
        if let RenderMode::Offline { duration } = self.mode {
            if duration.is_nan() || duration < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "offline duration {} must be non-negative",
                    duration
                )));
            }
        }
        Ok(())
    }

    /// Duration of one live buffer, in seconds.
    pub fn buffer_duration(&self) -> f64 {
        self.buffer_size as f64 / self.sample_rate
    }
}

/// Builder for [`Context`].
///
/// ```ignore
/// let ctx = Context::builder().sample_rate(48000.0).bpm(90.0).build()?;
/// ```
#[derive(Default)]
pub struct ContextBuilder {
    config: ContextConfig,
    clock: Option<Box<dyn HostClock>>,
}

impl ContextBuilder {
    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.config.sample_rate = rate;
        self
    }

    pub fn buffer_size(mut self, frames: usize) -> Self {
        self.config.buffer_size = frames;
        self
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.bpm = bpm;
        self
    }

    /// Render `duration` seconds in one go when the context starts.
    pub fn offline(mut self, duration: f64) -> Self {
        self.config.mode = RenderMode::Offline { duration };
        self
    }

    pub fn config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the host clock used as a fallback timestamp source.
    pub fn clock(mut self, clock: impl HostClock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> Result<Context> {
        match self.clock {
            Some(clock) => Context::with_clock(self.config, clock),
            None => Context::new(self.config),
        }
    }
}
