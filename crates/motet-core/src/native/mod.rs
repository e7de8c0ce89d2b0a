//! In-process model of the native node graph.
//!
//! The scheduler and graph builder only need a handful of native primitives:
//! gain, constant source, analyser and destination nodes, generic native
//! nodes with named controls, and connect/disconnect by reference.
//! [`NodeGraph`] records those nodes in an arena. It performs no sample
//! processing; the host's audio backend does.

mod control;
mod snapshot;

pub use control::{AutomationEvent, Control};
pub use snapshot::{ControlSnapshot, NodeSnapshot};

use crate::util::finite;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Handle to a node in a [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an automatable control owned by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId(u32);

impl ControlId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Node(NodeId),
    Control(ControlId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Multiplies (and sums) its inputs by the `gain` control.
    Gain,
    /// Emits the `offset` control as a signal (a DC source).
    ConstantSource,
    Analyser,
    Destination,
    /// Any other node type provided by the host, identified by name.
    Native(String),
}

impl NodeKind {
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Gain => "GainNode",
            NodeKind::ConstantSource => "ConstantSourceNode",
            NodeKind::Analyser => "AnalyserNode",
            NodeKind::Destination => "AudioDestinationNode",
            NodeKind::Native(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    label: Option<String>,
    controls: Vec<(String, ControlId)>,
    inputs: Vec<NodeId>,
    outputs: Vec<Target>,
    madd_optimizable: bool,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn controls(&self) -> &[(String, ControlId)] {
        &self.controls
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Target] {
        &self.outputs
    }

    /// A gain node that was created only to carry a unit's output and whose
    /// coefficient may be overwritten in place by a `mul` adapter.
    pub fn is_madd_optimizable(&self) -> bool {
        self.madd_optimizable
    }
}

/// Arena of native nodes and their controls.
///
/// Handles are never reused: removing nodes frees their slots, and a stale
/// handle simply stops resolving.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    nodes: HashMap<NodeId, Node>,
    controls: HashMap<ControlId, Control>,
    next_node: u32,
    next_control: u32,
    destination: NodeId,
}

impl NodeGraph {
    /// Create a graph holding only the hardware destination node.
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: HashMap::new(),
            controls: HashMap::new(),
            next_node: 0,
            next_control: 0,
            destination: NodeId(0),
        };
        graph.destination = graph.add_node(NodeKind::Destination, &[]);
        graph
    }

    fn add_node(&mut self, kind: NodeKind, controls: &[(&str, f64)]) -> NodeId {
        let controls = controls
            .iter()
            .map(|(name, value)| {
                let id = ControlId(self.next_control);
                self.next_control += 1;
                self.controls.insert(id, Control::new(*value));
                (name.to_string(), id)
            })
            .collect();
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                label: None,
                controls,
                inputs: Vec::new(),
                outputs: Vec::new(),
                madd_optimizable: false,
            },
        );
        id
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn create_gain(&mut self, gain: f64) -> NodeId {
        self.add_node(NodeKind::Gain, &[("gain", gain)])
    }

    pub fn create_constant(&mut self, offset: f64) -> NodeId {
        self.add_node(NodeKind::ConstantSource, &[("offset", offset)])
    }

    pub fn create_analyser(&mut self) -> NodeId {
        self.add_node(NodeKind::Analyser, &[])
    }

    /// Create a host-provided node type with the given automatable controls.
    pub fn create_native(&mut self, type_name: impl Into<String>, controls: &[(&str, f64)]) -> NodeId {
        self.add_node(NodeKind::Native(type_name.into()), controls)
    }

    /// Number of live nodes, including the destination.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(&id)
    }

    pub fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.controls.get_mut(&id)
    }

    /// Look up a node's control by name (`"gain"`, `"offset"`, ...).
    pub fn control_of(&self, node: NodeId, name: &str) -> Option<ControlId> {
        self.node(node)?
            .controls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// The node that owns a control.
    pub fn owner_of(&self, control: ControlId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.controls.iter().any(|(_, id)| *id == control))
            .map(|(id, _)| *id)
    }

    /// Set the intrinsic value of a node's named control.
    pub fn set_control_value(&mut self, node: NodeId, name: &str, value: f64) -> bool {
        match self.control_of(node, name).and_then(|id| self.control_mut(id)) {
            Some(control) => {
                control.set_value(finite(value));
                true
            }
            None => false,
        }
    }

    pub fn control_value(&self, node: NodeId, name: &str) -> Option<f64> {
        self.control_of(node, name)
            .and_then(|id| self.control(id))
            .map(Control::value)
    }

    pub fn set_label(&mut self, node: NodeId, label: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.label = Some(label.into());
        }
    }

    pub fn set_madd_optimizable(&mut self, node: NodeId, optimizable: bool) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.madd_optimizable = optimizable;
        }
    }

    pub fn is_madd_optimizable(&self, node: NodeId) -> bool {
        self.node(node).map(Node::is_madd_optimizable).unwrap_or(false)
    }

    fn has_target(&self, target: Target) -> bool {
        match target {
            Target::Node(id) => self.nodes.contains_key(&id),
            Target::Control(id) => self.controls.contains_key(&id),
        }
    }

    /// Wire `from` into a node input or a control. Duplicate connections are
    /// ignored; unknown handles are a no-op.
    pub fn connect(&mut self, from: NodeId, to: Target) {
        if !self.has_target(to) {
            return;
        }
        let Some(node) = self.nodes.get_mut(&from) else {
            return;
        };
        if node.outputs.contains(&to) {
            return;
        }
        node.outputs.push(to);

        match to {
            Target::Node(id) => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.inputs.push(from);
                }
            }
            Target::Control(id) => {
                if let Some(control) = self.controls.get_mut(&id) {
                    control.inputs.push(from);
                }
            }
        }
    }

    /// Remove every outgoing connection of `from` and return the targets it
    /// was feeding.
    pub fn disconnect(&mut self, from: NodeId) -> Vec<Target> {
        let Some(node) = self.nodes.get_mut(&from) else {
            return Vec::new();
        };
        let targets = std::mem::take(&mut node.outputs);

        for target in &targets {
            match *target {
                Target::Node(id) => {
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.inputs.retain(|n| *n != from);
                    }
                }
                Target::Control(id) => {
                    if let Some(control) = self.controls.get_mut(&id) {
                        control.inputs.retain(|n| *n != from);
                    }
                }
            }
        }
        targets
    }

    pub fn is_connected(&self, from: NodeId, to: Target) -> bool {
        self.node(from)
            .map(|node| node.outputs.contains(&to))
            .unwrap_or(false)
    }

    /// Drop every node except the destination and `keep`, together with
    /// their controls and any connection touching them. Returns the number
    /// of nodes removed.
    pub fn retain(&mut self, keep: &[NodeId]) -> usize {
        let before = self.nodes.len();
        let destination = self.destination;
        self.nodes.retain(|id, _| *id == destination || keep.contains(id));

        let live_nodes: HashSet<NodeId> = self.nodes.keys().copied().collect();
        let live_controls: HashSet<ControlId> = self
            .nodes
            .values()
            .flat_map(|node| node.controls.iter().map(|(_, id)| *id))
            .collect();
        self.controls.retain(|id, _| live_controls.contains(id));

        for node in self.nodes.values_mut() {
            node.inputs.retain(|id| live_nodes.contains(id));
            node.outputs.retain(|target| match target {
                Target::Node(id) => live_nodes.contains(id),
                Target::Control(id) => live_controls.contains(id),
            });
        }
        for control in self.controls.values_mut() {
            control.inputs.retain(|id| live_nodes.contains(id));
        }
        before - self.nodes.len()
    }

    /// Forget automation events that can no longer affect any value at or
    /// after `time`.
    pub fn prune_automation(&mut self, time: f64) {
        for control in self.controls.values_mut() {
            control.prune_before(time);
        }
    }

    /// Nested description of `node` and everything feeding it.
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        self.node(node)?;
        let mut path = Vec::new();
        Some(snapshot::describe(self, node, &mut path))
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}
