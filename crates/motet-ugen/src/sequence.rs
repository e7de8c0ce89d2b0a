//! Pull-based value sequences driving `iter` generators.

use motet_core::util::finite;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// One pull from a [`Sequence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Value(f64),
    Done,
}

type Source = Box<dyn Iterator<Item = f64> + Send>;

/// A lazy, possibly infinite, non-restartable sequence of numbers.
///
/// Clones share the same cursor. Once exhausted a sequence stays exhausted.
#[derive(Clone)]
pub struct Sequence {
    source: Arc<Mutex<Source>>,
}

impl Sequence {
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Send + 'static,
    {
        Self {
            source: Arc::new(Mutex::new(Box::new(values.into_iter().fuse()))),
        }
    }

    /// A single value, then done.
    pub fn once(value: f64) -> Self {
        Self::new(std::iter::once(value))
    }

    /// The same value forever.
    pub fn repeat(value: f64) -> Self {
        Self::new(std::iter::repeat(value))
    }

    /// Values produced by a closure until it returns `None`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> Option<f64> + Send + 'static,
    {
        Self::new(std::iter::from_fn(f))
    }

    /// Pull the next value. Non-finite values come out as `0.0`.
    pub fn next(&self) -> Step {
        match self.source.lock().next() {
            Some(value) => Step::Value(finite(value)),
            None => Step::Done,
        }
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").finish_non_exhaustive()
    }
}

impl From<Vec<f64>> for Sequence {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for Sequence {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl From<f64> for Sequence {
    fn from(value: f64) -> Self {
        Self::once(value)
    }
}
