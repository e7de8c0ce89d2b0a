//! Serializable description of a subgraph, used for inspection and tests.

use super::{NodeGraph, NodeId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSnapshot {
    pub name: String,
    pub value: f64,
    pub inputs: Vec<NodeSnapshot>,
}

/// A node, its controls and (recursively) everything connected into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Node type name, suffixed with `#label` when the node carries one.
    pub name: String,
    pub controls: Vec<ControlSnapshot>,
    pub inputs: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Total number of nodes in this description.
    pub fn count(&self) -> usize {
        1 + self.inputs.iter().map(NodeSnapshot::count).sum::<usize>()
            + self
                .controls
                .iter()
                .flat_map(|c| c.inputs.iter())
                .map(NodeSnapshot::count)
                .sum::<usize>()
    }

    pub fn control(&self, name: &str) -> Option<&ControlSnapshot> {
        self.controls.iter().find(|c| c.name == name)
    }
}

pub(super) fn describe(graph: &NodeGraph, id: NodeId, path: &mut Vec<NodeId>) -> NodeSnapshot {
    let Some(node) = graph.node(id) else {
        return NodeSnapshot {
            name: String::new(),
            controls: Vec::new(),
            inputs: Vec::new(),
        };
    };
    let name = match &node.label {
        Some(label) => format!("{}#{}", node.kind.name(), label),
        None => node.kind.name().to_string(),
    };

    // feedback loops are cut at the first repeat
    if path.contains(&id) {
        return NodeSnapshot {
            name,
            controls: Vec::new(),
            inputs: Vec::new(),
        };
    }
    path.push(id);

    let controls = node
        .controls
        .iter()
        .filter_map(|(control_name, control_id)| {
            let control = graph.control(*control_id)?;
            Some(ControlSnapshot {
                name: control_name.clone(),
                value: control.value(),
                inputs: control
                    .inputs
                    .iter()
                    .map(|input| describe(graph, *input, path))
                    .collect(),
            })
        })
        .collect();

    let inputs = node
        .inputs
        .iter()
        .map(|input| describe(graph, *input, path))
        .collect();

    path.pop();

    NodeSnapshot {
        name,
        controls,
        inputs,
    }
}
