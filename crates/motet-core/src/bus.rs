//! Audio buses: indexed mixing points toward the destination.

use crate::native::NodeId;

/// A lazily created mixing node owned by a [`Context`](crate::Context).
///
/// The bus tracks which nodes currently feed it so callers can tell an idle
/// bus from a busy one.
#[derive(Debug, Clone)]
pub struct AudioBus {
    index: usize,
    node: NodeId,
    inputs: Vec<NodeId>,
}

impl AudioBus {
    pub(crate) fn new(index: usize, node: NodeId) -> Self {
        Self {
            index,
            node,
            inputs: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The gain (mixer) node signals are summed into.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn is_idle(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn on_connected(&mut self, from: NodeId) {
        if !self.inputs.contains(&from) {
            self.inputs.push(from);
        }
    }

    pub fn on_disconnected(&mut self, from: NodeId) {
        self.inputs.retain(|n| *n != from);
    }
}
