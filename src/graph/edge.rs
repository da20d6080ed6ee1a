//! Edge implementation for causal graphs
//!
//! An edge is an unordered pair of (node, endpoint) half-edges, e.g.
//! `X --> Y`, `X o-> Y`, `X <-> Y`, or `X --- Y`. Construction canonicalizes
//! the pair so that an edge never "points left": if endpoint1 is an arrow and
//! endpoint2 is a tail or circle, the node order is swapped. All code that
//! builds edges by hand must go through [`Edge::new`] so the invariant holds.

use super::node::Node;
use super::types::{Endpoint, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display-only property tags an edge can carry (definitely-direct,
/// no-latent, possibly-direct, possibly-latent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeProperty {
    Dd,
    Nl,
    Pd,
    Pl,
}

/// The shape of an edge, as used in bootstrapped edge-type distributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    Nil,
    Ta,
    At,
    Ca,
    Ac,
    Cc,
    Aa,
    Tt,
}

/// A bootstrapped estimate of how probable one edge shape is.
///
/// Carried for display only; never consulted by the search algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTypeProbability {
    pub kind: EdgeKind,
    pub probability: f64,
}

/// An edge node1 *-# node2, where * and # are endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    node1: Node,
    node2: Node,
    endpoint1: Endpoint,
    endpoint2: Endpoint,

    /// Render the edge bold (display only)
    pub bold: bool,

    /// Line color (display only)
    pub color: Option<String>,

    /// Display-only property tags
    pub properties: Vec<EdgeProperty>,

    /// Bootstrapped edge-type distribution (display only)
    pub type_probabilities: Vec<EdgeTypeProbability>,
}

impl Edge {
    /// Construct a new edge, canonicalizing so it never points left
    pub fn new(node1: Node, node2: Node, endpoint1: Endpoint, endpoint2: Endpoint) -> Self {
        let (node1, node2, endpoint1, endpoint2) = if pointing_left(endpoint1, endpoint2) {
            (node2, node1, endpoint2, endpoint1)
        } else {
            (node1, node2, endpoint1, endpoint2)
        };
        Edge {
            node1,
            node2,
            endpoint1,
            endpoint2,
            bold: false,
            color: None,
            properties: Vec::new(),
            type_probabilities: Vec::new(),
        }
    }

    pub fn node1(&self) -> &Node {
        &self.node1
    }

    pub fn node2(&self) -> &Node {
        &self.node2
    }

    pub fn endpoint1(&self) -> Endpoint {
        self.endpoint1
    }

    pub fn endpoint2(&self) -> Endpoint {
        self.endpoint2
    }

    /// True if both endpoints are the Null mark
    pub fn is_null(&self) -> bool {
        self.endpoint1 == Endpoint::Null && self.endpoint2 == Endpoint::Null
    }

    /// The endpoint nearest to the given node, or None if the node is not
    /// along the edge
    pub fn proximal_endpoint(&self, node: NodeId) -> Option<Endpoint> {
        if self.node1.id == node {
            Some(self.endpoint1)
        } else if self.node2.id == node {
            Some(self.endpoint2)
        } else {
            None
        }
    }

    /// The endpoint furthest from the given node
    pub fn distal_endpoint(&self, node: NodeId) -> Option<Endpoint> {
        if self.node1.id == node {
            Some(self.endpoint2)
        } else if self.node2.id == node {
            Some(self.endpoint1)
        } else {
            None
        }
    }

    /// The node at the opposite end of the edge from the given node
    pub fn distal_node(&self, node: NodeId) -> Option<&Node> {
        if self.node1.id == node {
            Some(&self.node2)
        } else if self.node2.id == node {
            Some(&self.node1)
        } else {
            None
        }
    }

    /// True if the edge points toward the given node: x --> node or x o-> node
    pub fn points_toward(&self, node: NodeId) -> bool {
        let proximal = self.proximal_endpoint(node);
        let distal = self.distal_endpoint(node);
        proximal == Some(Endpoint::Arrow)
            && matches!(distal, Some(Endpoint::Tail) | Some(Endpoint::Circle))
    }

    /// True if the edge connects the given unordered node pair
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.node1.id == a && self.node2.id == b) || (self.node1.id == b && self.node2.id == a)
    }

    pub fn add_property(&mut self, property: EdgeProperty) {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
    }

    pub fn remove_property(&mut self, property: EdgeProperty) {
        self.properties.retain(|p| *p != property);
    }

    pub fn add_type_probability(&mut self, tp: EdgeTypeProbability) {
        self.type_probabilities.push(tp);
    }
}

/// True if an edge with these endpoints would point from right to left
pub(crate) fn pointing_left(endpoint1: Endpoint, endpoint2: Endpoint) -> bool {
    endpoint1 == Endpoint::Arrow
        && (endpoint2 == Endpoint::Tail || endpoint2 == Endpoint::Circle)
}

// Equality is over the node pair and endpoints, symmetric under the
// canonical swap; decorations are ignored.
impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.node1 == other.node1
            && self.node2 == other.node2
            && self.endpoint1 == other.endpoint1
            && self.endpoint2 == other.endpoint2)
            || (self.node1 == other.node2
                && self.node2 == other.node1
                && self.endpoint1 == other.endpoint2
                && self.endpoint2 == other.endpoint1)
    }
}

impl Eq for Edge {}

// Hash over the unordered node pair only, so swapped-but-equal edges
// collide as required.
impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let (lo, hi) = if self.node1.id <= self.node2.id {
            (self.node1.id, self.node2.id)
        } else {
            (self.node2.id, self.node1.id)
        };
        lo.hash(state);
        hi.hash(state);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end1 = match self.endpoint1 {
            Endpoint::Tail => "-",
            Endpoint::Arrow => "<",
            Endpoint::Circle => "o",
            _ => " ",
        };
        let end2 = match self.endpoint2 {
            Endpoint::Tail => "-",
            Endpoint::Arrow => ">",
            Endpoint::Circle => "o",
            _ => " ",
        };
        write!(f, "{} {}-{} {}", self.node1.name(), end1, end2, self.node2.name())?;
        for p in &self.properties {
            write!(f, " {:?}", p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> (Node, Node) {
        (Node::new("X"), Node::new("Y"))
    }

    #[test]
    fn test_canonical_swap() {
        // X <-- Y points left, so the stored order must flip to Y --> X.
        let (x, y) = nodes();
        let edge = Edge::new(x.clone(), y.clone(), Endpoint::Arrow, Endpoint::Tail);
        assert_eq!(edge.node1(), &y);
        assert_eq!(edge.node2(), &x);
        assert_eq!(edge.endpoint1(), Endpoint::Tail);
        assert_eq!(edge.endpoint2(), Endpoint::Arrow);
    }

    #[test]
    fn test_canonical_swap_all_combinations() {
        use Endpoint::*;
        let (x, y) = nodes();
        for e1 in [Tail, Arrow, Circle, Star, Null] {
            for e2 in [Tail, Arrow, Circle, Star, Null] {
                let edge = Edge::new(x.clone(), y.clone(), e1, e2);
                let swapped = e1 == Arrow && (e2 == Tail || e2 == Circle);
                if swapped {
                    assert_eq!(edge.node1(), &y, "{:?} {:?}", e1, e2);
                    assert_eq!(edge.endpoint1(), e2);
                    assert_eq!(edge.endpoint2(), e1);
                } else {
                    assert_eq!(edge.node1(), &x, "{:?} {:?}", e1, e2);
                    assert_eq!(edge.endpoint1(), e1);
                    assert_eq!(edge.endpoint2(), e2);
                }
            }
        }
    }

    #[test]
    fn test_symmetric_equality() {
        let (x, y) = nodes();
        let e1 = Edge::new(x.clone(), y.clone(), Endpoint::Tail, Endpoint::Tail);
        let e2 = Edge::new(y.clone(), x.clone(), Endpoint::Tail, Endpoint::Tail);
        assert_eq!(e1, e2);

        let directed = Edge::new(x.clone(), y.clone(), Endpoint::Tail, Endpoint::Arrow);
        let reversed = Edge::new(y, x, Endpoint::Tail, Endpoint::Arrow);
        assert_ne!(directed, reversed);
    }

    #[test]
    fn test_equality_ignores_decorations() {
        let (x, y) = nodes();
        let plain = Edge::new(x.clone(), y.clone(), Endpoint::Tail, Endpoint::Arrow);
        let mut decorated = Edge::new(x, y, Endpoint::Tail, Endpoint::Arrow);
        decorated.bold = true;
        decorated.add_property(EdgeProperty::Dd);
        assert_eq!(plain, decorated);
    }

    #[test]
    fn test_proximal_distal() {
        let (x, y) = nodes();
        let edge = Edge::new(x.clone(), y.clone(), Endpoint::Tail, Endpoint::Arrow);
        assert_eq!(edge.proximal_endpoint(x.id), Some(Endpoint::Tail));
        assert_eq!(edge.proximal_endpoint(y.id), Some(Endpoint::Arrow));
        assert_eq!(edge.distal_endpoint(x.id), Some(Endpoint::Arrow));
        assert_eq!(edge.distal_node(x.id), Some(&y));
        assert!(edge.points_toward(y.id));
        assert!(!edge.points_toward(x.id));

        let other = Node::new("Z");
        assert_eq!(edge.proximal_endpoint(other.id), None);
    }

    #[test]
    fn test_display() {
        let (x, y) = nodes();
        let edge = Edge::new(x.clone(), y.clone(), Endpoint::Tail, Endpoint::Arrow);
        assert_eq!(format!("{}", edge), "X --> Y");
        let undirected = Edge::new(x.clone(), y.clone(), Endpoint::Tail, Endpoint::Tail);
        assert_eq!(format!("{}", undirected), "X --- Y");
        let partial = Edge::new(x, y, Endpoint::Circle, Endpoint::Arrow);
        assert_eq!(format!("{}", partial), "X o-> Y");
    }
}
