//! Host clocks used as a fallback timestamp source.

use crate::lockfree::AtomicDouble;
use std::sync::Arc;
use std::time::Instant;

/// Source of the host's notion of "now", in seconds.
pub trait HostClock: Send {
    fn now(&self) -> f64;
}

/// Wall-clock seconds since the clock was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to. Used for offline rendering and tests.
///
/// Clones share the same time value.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Arc<AtomicDouble>,
}

impl ManualClock {
    pub fn new(time: f64) -> Self {
        Self {
            time: Arc::new(AtomicDouble::new(time)),
        }
    }

    pub fn set(&self, time: f64) {
        self.time.set(time);
    }

    pub fn advance(&self, delta: f64) {
        self.time.set(self.time.get() + delta);
    }
}

impl HostClock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}
