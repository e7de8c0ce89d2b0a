//! Forward references to generators declared later in a synth definition.

use crate::error::{Result, UGenError};
use crate::ugen::UGen;
use motet_core::{Connectable, Context, Destination, NodeId, Outlet};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    Pending,
    Resolved,
}

struct PromiseInner {
    id: String,
    ugen: OnceCell<UGen>,
    pending: Mutex<Vec<Destination>>,
    relay: Mutex<Option<NodeId>>,
}

/// A `#id` reference. Connections made while it is pending are recorded and
/// replayed once the generator with that id is built.
///
/// Reading the outlet of a pending reference creates a unity gain relay the
/// generator is wired into on resolution. Until then the relay is silent.
#[derive(Clone)]
pub struct UGenPromise {
    inner: Arc<PromiseInner>,
}

impl UGenPromise {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(PromiseInner {
                id: id.into(),
                ugen: OnceCell::new(),
                pending: Mutex::new(Vec::new()),
                relay: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn state(&self) -> PromiseState {
        match self.inner.ugen.get() {
            Some(_) => PromiseState::Resolved,
            None => PromiseState::Pending,
        }
    }

    pub fn get(&self) -> Option<&UGen> {
        self.inner.ugen.get()
    }

    /// Number of connections waiting for resolution.
    pub fn pending_connections(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// The relay node handed out while pending, if any.
    pub fn relay(&self) -> Option<NodeId> {
        *self.inner.relay.lock()
    }

    /// Bind the reference and connect everything recorded so far.
    pub fn resolve(&self, ctx: &mut Context, ugen: &UGen) -> Result<()> {
        self.inner
            .ugen
            .set(ugen.clone())
            .map_err(|_| UGenError::AlreadyResolved(self.inner.id.clone()))?;

        let pending = std::mem::take(&mut *self.inner.pending.lock());
        let relay = self.relay();
        debug!(
            id = %self.inner.id,
            connections = pending.len(),
            relayed = relay.is_some(),
            "Resolved forward reference"
        );
        for to in pending {
            ugen.connect_to(ctx, to);
        }
        if let Some(relay) = relay {
            ugen.connect_to(ctx, Destination::Node(relay));
        }
        Ok(())
    }
}

impl Connectable for UGenPromise {
    fn outlet(&self, ctx: &mut Context) -> Outlet {
        match self.inner.ugen.get() {
            Some(ugen) => Connectable::outlet(ugen, ctx),
            None => {
                let mut relay = self.inner.relay.lock();
                let node = *relay.get_or_insert_with(|| ctx.graph_mut().create_gain(1.0));
                Outlet::node(node)
            }
        }
    }

    fn connect_to(&self, ctx: &mut Context, to: Destination) {
        match self.inner.ugen.get() {
            Some(ugen) => ugen.connect_to(ctx, to),
            None => self.inner.pending.lock().push(to),
        }
    }

    fn disconnect_from(&self, ctx: &mut Context) {
        match self.inner.ugen.get() {
            Some(ugen) => ugen.disconnect_from(ctx),
            None => {
                self.inner.pending.lock().clear();
                if let Some(relay) = self.relay() {
                    ctx.disconnect_node(relay);
                }
            }
        }
    }
}

impl From<UGenPromise> for motet_core::Input {
    fn from(promise: UGenPromise) -> Self {
        motet_core::Input::Signal(Arc::new(promise))
    }
}

impl fmt::Debug for UGenPromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UGenPromise")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}
