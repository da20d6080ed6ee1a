//! Factory and predicate helpers for the edge types used in causal graphs.
//!
//! These produce and recognize the common shapes: directed (-->), undirected
//! (---), bidirected (<->), nondirected (o-o), and partially oriented (o->).
//! An edge counts as, e.g., directed just in case its endpoints match the
//! directed pattern, whether or not this factory built it.

use super::edge::Edge;
use super::node::Node;
use super::types::{Endpoint, NodeId};
use super::GraphError;

/// Construct a directed edge node1 --> node2
pub fn directed(node1: Node, node2: Node) -> Edge {
    Edge::new(node1, node2, Endpoint::Tail, Endpoint::Arrow)
}

/// Construct an undirected edge node1 --- node2
pub fn undirected(node1: Node, node2: Node) -> Edge {
    Edge::new(node1, node2, Endpoint::Tail, Endpoint::Tail)
}

/// Construct a bidirected edge node1 <-> node2
pub fn bidirected(node1: Node, node2: Node) -> Edge {
    Edge::new(node1, node2, Endpoint::Arrow, Endpoint::Arrow)
}

/// Construct a nondirected edge node1 o-o node2
pub fn nondirected(node1: Node, node2: Node) -> Edge {
    Edge::new(node1, node2, Endpoint::Circle, Endpoint::Circle)
}

/// Construct a partially oriented edge node1 o-> node2
pub fn partially_oriented(node1: Node, node2: Node) -> Edge {
    Edge::new(node1, node2, Endpoint::Circle, Endpoint::Arrow)
}

/// True if the edge is undirected (---)
pub fn is_undirected(edge: &Edge) -> bool {
    edge.endpoint1() == Endpoint::Tail && edge.endpoint2() == Endpoint::Tail
}

/// True if the edge is directed (--> in either stored order)
pub fn is_directed(edge: &Edge) -> bool {
    (edge.endpoint1() == Endpoint::Tail && edge.endpoint2() == Endpoint::Arrow)
        || (edge.endpoint2() == Endpoint::Tail && edge.endpoint1() == Endpoint::Arrow)
}

/// True if the edge is bidirected (<->)
pub fn is_bidirected(edge: &Edge) -> bool {
    edge.endpoint1() == Endpoint::Arrow && edge.endpoint2() == Endpoint::Arrow
}

/// The node opposite the given node along the edge
pub fn traverse(node: NodeId, edge: &Edge) -> Option<&Node> {
    edge.distal_node(node)
}

/// For A --> B, given A, returns B; for A <-- B, given B, returns A.
pub fn traverse_directed(node: NodeId, edge: &Edge) -> Option<&Node> {
    if edge.node1().id == node
        && edge.endpoint1() == Endpoint::Tail
        && edge.endpoint2() == Endpoint::Arrow
    {
        return Some(edge.node2());
    }
    if edge.node2().id == node
        && edge.endpoint1() == Endpoint::Arrow
        && edge.endpoint2() == Endpoint::Tail
    {
        return Some(edge.node1());
    }
    None
}

/// For A --* B or A o-* B, given A, returns B
pub fn traverse_semi_directed(node: NodeId, edge: &Edge) -> Option<&Node> {
    if edge.node1().id == node {
        if edge.endpoint1() == Endpoint::Tail || edge.endpoint1() == Endpoint::Circle {
            return Some(edge.node2());
        }
    } else if edge.node2().id == node
        && (edge.endpoint2() == Endpoint::Tail || edge.endpoint2() == Endpoint::Circle)
    {
        return Some(edge.node1());
    }
    None
}

/// For a directed edge, the node at the tail
pub fn directed_tail(edge: &Edge) -> Result<&Node, GraphError> {
    if edge.endpoint1() == Endpoint::Tail && edge.endpoint2() == Endpoint::Arrow {
        Ok(edge.node1())
    } else if edge.endpoint2() == Endpoint::Tail && edge.endpoint1() == Endpoint::Arrow {
        Ok(edge.node2())
    } else {
        Err(GraphError::NotDirected(edge.to_string()))
    }
}

/// For a directed edge, the node at the arrow
pub fn directed_head(edge: &Edge) -> Result<&Node, GraphError> {
    if edge.endpoint1() == Endpoint::Arrow && edge.endpoint2() == Endpoint::Tail {
        Ok(edge.node1())
    } else if edge.endpoint2() == Endpoint::Arrow && edge.endpoint1() == Endpoint::Tail {
        Ok(edge.node2())
    } else {
        Err(GraphError::NotDirected(edge.to_string()))
    }
}
