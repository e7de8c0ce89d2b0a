//! External values polled by `object` generators.

use hashbrown::HashMap;
use motet_core::AtomicDouble;
use parking_lot::RwLock;

/// Something an `object` generator can poll.
///
/// `value_of` is read when no key is given (or the key is unknown);
/// `field` resolves a named key.
pub trait Watch: Send + Sync {
    fn value_of(&self) -> f64;

    fn field(&self, _key: &str) -> Option<f64> {
        None
    }
}

impl<F> Watch for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn value_of(&self) -> f64 {
        self()
    }
}

impl Watch for AtomicDouble {
    fn value_of(&self) -> f64 {
        self.get()
    }
}

/// A set of named numeric fields that can be updated from any thread.
#[derive(Debug, Default)]
pub struct WatchedFields {
    fields: RwLock<HashMap<String, f64>>,
}

impl WatchedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: f64) {
        self.fields.write().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.fields.read().get(key).copied()
    }
}

impl Watch for WatchedFields {
    /// Sum of all fields.
    fn value_of(&self) -> f64 {
        self.fields.read().values().sum()
    }

    fn field(&self, key: &str) -> Option<f64> {
        self.get(key)
    }
}
