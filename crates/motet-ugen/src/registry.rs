//! Generator registry
//!
//! Maps generator names to constructors. Clones share the same table, so a
//! name registered through one handle is visible to every synth built from
//! another.

use crate::builtin::register_builtin_ugens;
use crate::error::{Result, UGenError};
use crate::selector::is_valid_ugen_name;
use crate::spec::Spec;
use crate::ugen::UGenScope;
use crate::unit::Unit;
use hashbrown::HashMap;
use motet_core::Input;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Function that builds a unit from a spec and inputs.
pub type UGenConstructor =
    Arc<dyn Fn(&mut UGenScope<'_>, &Spec, &[Input]) -> Result<Unit> + Send + Sync>;

pub struct UGenRegistry {
    constructors: Arc<RwLock<HashMap<String, UGenConstructor>>>,
}

impl UGenRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            constructors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a constructor under `name`, replacing any previous one.
    ///
    /// # Example
    /// ```ignore
    /// registry.register("dc", |_, spec, _| {
    ///     Ok(Unit::builder().outlet(spec.f64_or("value", 0.0)).build())
    /// })?;
    /// ```
    pub fn register<F>(&self, name: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(&mut UGenScope<'_>, &Spec, &[Input]) -> Result<Unit> + Send + Sync + 'static,
    {
        let name = name.into();
        if !is_valid_ugen_name(&name) {
            return Err(UGenError::InvalidName(name));
        }
        let previous = self
            .constructors
            .write()
            .insert(name.clone(), Arc::new(constructor));
        if previous.is_some() {
            debug!(name = %name, "Replaced ugen constructor");
        }
        Ok(())
    }

    /// Registration path for names known to be valid.
    pub(crate) fn insert(&self, name: &str, constructor: UGenConstructor) {
        self.constructors.write().insert(name.to_string(), constructor);
    }

    /// Look up a constructor. The table lock is released before the caller
    /// runs it, so constructors may build other generators.
    pub fn get(&self, name: &str) -> Option<UGenConstructor> {
        self.constructors.read().get(name).cloned()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.constructors.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.constructors.write().remove(name).is_some()
    }

    pub fn clear(&self) {
        self.constructors.write().clear();
    }
}

impl Default for UGenRegistry {
    fn default() -> Self {
        let registry = Self::new();
        register_builtin_ugens(&registry);
        registry
    }
}

impl Clone for UGenRegistry {
    fn clone(&self) -> Self {
        Self {
            constructors: Arc::clone(&self.constructors),
        }
    }
}

impl std::fmt::Debug for UGenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UGenRegistry")
            .field("types", &self.list_types())
            .finish()
    }
}
