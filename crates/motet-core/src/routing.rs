//! Values that can be routed into the graph.
//!
//! [`Input`] is the closed set of things the context knows how to turn into
//! native nodes: numeric constants, existing nodes, params, lists (summed)
//! and anything implementing [`Connectable`]. Everything else is
//! [`Input::Null`].

use crate::context::Context;
use crate::native::{ControlId, NodeId, Target};
use crate::param::Param;
use crate::util::finite;
use std::fmt;
use std::sync::Arc;

/// Where a connection ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Node(NodeId),
    Control(ControlId),
    /// An audio bus of the context, by index (clamped on use).
    Bus(i64),
}

impl From<NodeId> for Destination {
    fn from(id: NodeId) -> Self {
        Destination::Node(id)
    }
}

impl From<ControlId> for Destination {
    fn from(id: ControlId) -> Self {
        Destination::Control(id)
    }
}

impl From<Target> for Destination {
    fn from(target: Target) -> Self {
        match target {
            Target::Node(id) => Destination::Node(id),
            Target::Control(id) => Destination::Control(id),
        }
    }
}

/// Connectable output of a unit: an optional signal node plus a constant
/// offset added on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outlet {
    pub node: Option<NodeId>,
    pub offset: f64,
}

impl Outlet {
    pub const NULL: Outlet = Outlet {
        node: None,
        offset: 0.0,
    };

    pub fn node(node: NodeId) -> Self {
        Self {
            node: Some(node),
            offset: 0.0,
        }
    }

    pub fn constant(offset: f64) -> Self {
        Self {
            node: None,
            offset: finite(offset),
        }
    }

    pub fn is_null(&self) -> bool {
        self.node.is_none() && self.offset == 0.0
    }

    /// The value of an outlet that carries no signal.
    pub fn constant_value(&self) -> Option<f64> {
        match self.node {
            None => Some(self.offset),
            Some(_) => None,
        }
    }
}

/// Something that produces a subgraph and knows how to wire it.
pub trait Connectable: Send + Sync {
    /// The outlet to connect from. May create nodes on first use.
    fn outlet(&self, ctx: &mut Context) -> Outlet;

    fn connect_to(&self, ctx: &mut Context, to: Destination) {
        let outlet = self.outlet(ctx);
        ctx.connect_outlet(outlet, to);
    }

    fn disconnect_from(&self, ctx: &mut Context) {
        if let Some(node) = self.outlet(ctx).node {
            ctx.disconnect_node(node);
        }
    }
}

#[derive(Clone, Default)]
pub enum Input {
    #[default]
    Null,
    Number(f64),
    Node(NodeId),
    Param(Param),
    List(Vec<Input>),
    Signal(Arc<dyn Connectable>),
}

impl Input {
    pub fn signal(value: impl Connectable + 'static) -> Self {
        Input::Signal(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Input::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Input::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Resolve to an outlet. Lists fold their constants into the offset and
    /// sum their signals through one gain node when there is more than one.
    pub fn outlet(&self, ctx: &mut Context) -> Outlet {
        match self {
            Input::Null => Outlet::NULL,
            Input::Number(n) => Outlet::constant(*n),
            Input::Node(id) => Outlet::node(*id),
            Input::Param(param) => Outlet::node(param.node()),
            Input::Signal(signal) => signal.outlet(ctx),
            Input::List(items) => {
                let mut offset = 0.0;
                let mut nodes = Vec::new();
                for item in items {
                    let outlet = item.outlet(ctx);
                    offset += outlet.offset;
                    nodes.extend(outlet.node);
                }
                let node = match nodes.len() {
                    0 => None,
                    1 => Some(nodes[0]),
                    _ => Some(ctx.create_sum(&nodes)),
                };
                Outlet {
                    node,
                    offset: finite(offset),
                }
            }
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Null => write!(f, "Null"),
            Input::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Input::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Input::Param(param) => f.debug_tuple("Param").field(&param.value_of()).finish(),
            Input::List(items) => f.debug_tuple("List").field(items).finish(),
            Input::Signal(_) => write!(f, "Signal(..)"),
        }
    }
}

impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Input::Number(value)
    }
}

impl From<f32> for Input {
    fn from(value: f32) -> Self {
        Input::Number(value as f64)
    }
}

impl From<i32> for Input {
    fn from(value: i32) -> Self {
        Input::Number(value as f64)
    }
}

impl From<NodeId> for Input {
    fn from(id: NodeId) -> Self {
        Input::Node(id)
    }
}

impl From<Param> for Input {
    fn from(param: Param) -> Self {
        Input::Param(param)
    }
}

impl From<&Param> for Input {
    fn from(param: &Param) -> Self {
        Input::Param(param.clone())
    }
}

impl From<Vec<Input>> for Input {
    fn from(items: Vec<Input>) -> Self {
        Input::List(items)
    }
}

impl From<Vec<f64>> for Input {
    fn from(items: Vec<f64>) -> Self {
        Input::List(items.into_iter().map(Input::Number).collect())
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Input::Null)
    }
}
