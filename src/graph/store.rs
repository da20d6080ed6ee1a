//! Edge-list graph for causal search
//!
//! Stores a graph as a list of edges incident to each node plus a global
//! edge set. Edges are of the form N1 *-# N2 with typed endpoints; all edges
//! connecting the same unordered pair with the same endpoints are considered
//! equal, so adding a duplicate is a no-op. The incidence lists and the
//! global set are kept in agreement by routing every mutation through the
//! methods here.

use super::edge::Edge;
use super::edges;
use super::node::Node;
use super::triple::Triple;
use super::types::{Endpoint, NodeEquality, NodeId};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    NodeNotFound(String),

    #[error("a different node named {0} already exists in the graph")]
    DuplicateNodeName(String),

    #[error("no edge connects {0} and {1}")]
    NoConnectingEdge(String, String),

    #[error("more than one edge connects {0} and {1}")]
    MultipleConnectingEdges(String, String),

    #[error("not a directed edge: {0}")]
    NotDirected(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A mutable graph with typed endpoints
///
/// Invariants:
/// - no duplicate edges (same unordered node pair, same endpoints);
/// - every edge in the global set appears in both endpoints' incidence
///   lists, and vice versa;
/// - node names are unique within the graph.
#[derive(Debug, Clone)]
pub struct EdgeListGraph {
    /// Nodes in insertion order
    nodes: Vec<Node>,

    /// Name index
    names: FxHashMap<String, NodeId>,

    /// Incident edges per node
    edge_lists: FxHashMap<NodeId, Vec<Edge>>,

    /// Global edge set, in deterministic insertion order
    edges: IndexSet<Edge>,

    /// Node-comparison policy for cross-graph matching
    equality: NodeEquality,

    /// Triples marked ambiguous by conservative orientation
    ambiguous_triples: FxHashSet<Triple>,

    /// Underline-marked triples (definite noncolliders)
    underline_triples: FxHashSet<Triple>,

    /// Dotted-underline-marked triples
    dotted_underline_triples: FxHashSet<Triple>,
}

impl EdgeListGraph {
    /// Create an empty graph with the default (by-name) equality policy
    pub fn new() -> Self {
        Self::with_equality(NodeEquality::default())
    }

    /// Create an empty graph with an explicit equality policy
    pub fn with_equality(equality: NodeEquality) -> Self {
        EdgeListGraph {
            nodes: Vec::new(),
            names: FxHashMap::default(),
            edge_lists: FxHashMap::default(),
            edges: IndexSet::new(),
            equality,
            ambiguous_triples: FxHashSet::default(),
            underline_triples: FxHashSet::default(),
            dotted_underline_triples: FxHashSet::default(),
        }
    }

    /// Create a graph containing the given nodes and no edges
    pub fn with_nodes(nodes: Vec<Node>) -> GraphResult<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        Ok(graph)
    }

    /// Copy another graph: node and edge identities are shared, not renamed
    pub fn from_graph(graph: &EdgeListGraph) -> GraphResult<Self> {
        let mut copy = Self::with_equality(graph.equality);
        for node in graph.nodes() {
            copy.add_node(node.clone())?;
        }
        for edge in graph.edges() {
            copy.add_edge(edge.clone())?;
        }
        copy.ambiguous_triples = graph.ambiguous_triples.clone();
        copy.underline_triples = graph.underline_triples.clone();
        copy.dotted_underline_triples = graph.dotted_underline_triples.clone();
        Ok(copy)
    }

    pub fn equality(&self) -> NodeEquality {
        self.equality
    }

    // ---- nodes ----------------------------------------------------------

    /// Add a node. Re-adding the same node is a no-op returning false;
    /// a different node with an already-used name is an error.
    pub fn add_node(&mut self, node: Node) -> GraphResult<bool> {
        if let Some(&existing) = self.names.get(node.name()) {
            if existing == node.id {
                return Ok(false);
            }
            return Err(GraphError::DuplicateNodeName(node.name().to_string()));
        }
        self.names.insert(node.name().to_string(), node.id);
        self.edge_lists.insert(node.id, Vec::new());
        self.nodes.push(node);
        Ok(true)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.names.get(name).and_then(|id| self.node(*id))
    }

    /// Whether the graph contains this node, under the graph's equality policy
    pub fn contains_node(&self, node: &Node) -> bool {
        match self.equality {
            NodeEquality::ById => self.edge_lists.contains_key(&node.id),
            NodeEquality::ByName => self.names.contains_key(node.name()),
        }
    }

    /// The local node this foreign node matches, under the equality policy
    pub fn matching_node(&self, node: &Node) -> Option<&Node> {
        match self.equality {
            NodeEquality::ById => self.node(node.id),
            NodeEquality::ByName => self.node_by_name(node.name()),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    // ---- edges ----------------------------------------------------------

    /// Add an edge. Idempotent: adding an edge already present is a no-op
    /// returning false. Both endpoint nodes must already be in the graph.
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<bool> {
        if !self.edge_lists.contains_key(&edge.node1().id) {
            return Err(GraphError::NodeNotFound(edge.node1().name().to_string()));
        }
        if !self.edge_lists.contains_key(&edge.node2().id) {
            return Err(GraphError::NodeNotFound(edge.node2().name().to_string()));
        }
        if self.edges.contains(&edge) {
            return Ok(false);
        }
        let n1 = edge.node1().id;
        let n2 = edge.node2().id;
        self.edge_lists.get_mut(&n1).expect("checked").push(edge.clone());
        if n2 != n1 {
            self.edge_lists.get_mut(&n2).expect("checked").push(edge.clone());
        }
        self.edges.insert(edge);
        Ok(true)
    }

    pub fn add_directed_edge(&mut self, node1: &Node, node2: &Node) -> GraphResult<bool> {
        self.add_edge(edges::directed(node1.clone(), node2.clone()))
    }

    pub fn add_undirected_edge(&mut self, node1: &Node, node2: &Node) -> GraphResult<bool> {
        self.add_edge(edges::undirected(node1.clone(), node2.clone()))
    }

    pub fn add_bidirected_edge(&mut self, node1: &Node, node2: &Node) -> GraphResult<bool> {
        self.add_edge(edges::bidirected(node1.clone(), node2.clone()))
    }

    pub fn add_nondirected_edge(&mut self, node1: &Node, node2: &Node) -> GraphResult<bool> {
        self.add_edge(edges::nondirected(node1.clone(), node2.clone()))
    }

    pub fn add_partially_oriented_edge(&mut self, node1: &Node, node2: &Node) -> GraphResult<bool> {
        self.add_edge(edges::partially_oriented(node1.clone(), node2.clone()))
    }

    /// Remove an edge, returning whether it was present
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        if !self.edges.shift_remove(edge) {
            return false;
        }
        if let Some(list) = self.edge_lists.get_mut(&edge.node1().id) {
            list.retain(|e| e != edge);
        }
        if let Some(list) = self.edge_lists.get_mut(&edge.node2().id) {
            list.retain(|e| e != edge);
        }
        true
    }

    /// Remove the edge connecting the two given nodes.
    ///
    /// Errors when more than one edge connects the pair; callers must
    /// disambiguate first.
    pub fn remove_connecting_edge(&mut self, node1: NodeId, node2: NodeId) -> GraphResult<bool> {
        let connecting: Vec<Edge> = self.connecting_edges(node1, node2).into_iter().cloned().collect();
        if connecting.len() > 1 {
            return Err(GraphError::MultipleConnectingEdges(
                self.display_name(node1),
                self.display_name(node2),
            ));
        }
        match connecting.into_iter().next() {
            Some(edge) => Ok(self.remove_edge(&edge)),
            None => Ok(false),
        }
    }

    pub fn remove_edges(&mut self, edges: &[Edge]) -> bool {
        let mut changed = false;
        for edge in edges {
            changed |= self.remove_edge(edge);
        }
        changed
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All edges connecting the given unordered node pair
    pub fn connecting_edges(&self, node1: NodeId, node2: NodeId) -> Vec<&Edge> {
        match self.edge_lists.get(&node1) {
            Some(list) => list
                .iter()
                .filter(|e| e.distal_node(node1).map(|n| n.id) == Some(node2))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The edge between the pair, if any (first of possibly several)
    pub fn edge_between(&self, node1: NodeId, node2: NodeId) -> Option<&Edge> {
        self.connecting_edges(node1, node2).into_iter().next()
    }

    /// The endpoint of the connecting edge at the node2 end
    pub fn get_endpoint(&self, node1: NodeId, node2: NodeId) -> Option<Endpoint> {
        self.edge_between(node1, node2)
            .and_then(|e| e.proximal_endpoint(node2))
    }

    /// Replace the unique edge between node1 and node2 with one whose
    /// endpoint at node2 is as given, preserving the endpoint at node1.
    ///
    /// Errors when zero or multiple edges connect the pair.
    pub fn set_endpoint(
        &mut self,
        node1: NodeId,
        node2: NodeId,
        endpoint: Endpoint,
    ) -> GraphResult<()> {
        let connecting: Vec<Edge> = self.connecting_edges(node1, node2).into_iter().cloned().collect();
        if connecting.len() > 1 {
            return Err(GraphError::MultipleConnectingEdges(
                self.display_name(node1),
                self.display_name(node2),
            ));
        }
        let old = connecting.into_iter().next().ok_or_else(|| {
            GraphError::NoConnectingEdge(self.display_name(node1), self.display_name(node2))
        })?;
        let missing = || {
            GraphError::NoConnectingEdge(self.display_name(node1), self.display_name(node2))
        };
        let end1 = old.proximal_endpoint(node1).ok_or_else(missing)?;
        let n1 = old.distal_node(node2).ok_or_else(missing)?.clone();
        let n2 = old.distal_node(node1).ok_or_else(missing)?.clone();
        self.remove_edge(&old);
        self.add_edge(Edge::new(n1, n2, end1, endpoint))?;
        Ok(())
    }

    // ---- adjacency and kinship ------------------------------------------

    /// The nodes adjacent to the given node (deduplicated)
    pub fn adjacent_nodes(&self, node: NodeId) -> Vec<Node> {
        let mut adj: Vec<Node> = Vec::new();
        if let Some(list) = self.edge_lists.get(&node) {
            for edge in list {
                if let Some(distal) = edge.distal_node(node) {
                    if !adj.iter().any(|n| n.id == distal.id) {
                        adj.push(distal.clone());
                    }
                }
            }
        }
        adj
    }

    pub fn is_adjacent_to(&self, node1: NodeId, node2: NodeId) -> bool {
        self.edge_lists
            .get(&node1)
            .map(|list| list.iter().any(|e| e.distal_node(node1).map(|n| n.id) == Some(node2)))
            .unwrap_or(false)
    }

    /// Number of edges incident to the node
    pub fn degree(&self, node: NodeId) -> usize {
        self.edge_lists.get(&node).map(|l| l.len()).unwrap_or(0)
    }

    /// Parents: nodes at the tail of a directed edge into the given node
    pub fn parents(&self, node: NodeId) -> Vec<Node> {
        let mut parents = Vec::new();
        if let Some(list) = self.edge_lists.get(&node) {
            for edge in list {
                if edge.distal_endpoint(node) == Some(Endpoint::Tail)
                    && edge.proximal_endpoint(node) == Some(Endpoint::Arrow)
                {
                    if let Some(p) = edge.distal_node(node) {
                        parents.push(p.clone());
                    }
                }
            }
        }
        parents
    }

    /// Children: nodes at the arrow of a directed edge out of the given node
    pub fn children(&self, node: NodeId) -> Vec<Node> {
        let mut children = Vec::new();
        if let Some(list) = self.edge_lists.get(&node) {
            for edge in list {
                if let Some(c) = edges::traverse_directed(node, edge) {
                    children.push(c.clone());
                }
            }
        }
        children
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.parents(node).len()
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    pub fn is_parent_of(&self, node1: NodeId, node2: NodeId) -> bool {
        self.edge_lists
            .get(&node1)
            .map(|list| {
                list.iter()
                    .any(|e| edges::traverse_directed(node1, e).map(|n| n.id) == Some(node2))
            })
            .unwrap_or(false)
    }

    pub fn is_child_of(&self, node1: NodeId, node2: NodeId) -> bool {
        self.is_parent_of(node2, node1)
    }

    /// Ancestors of the given nodes (including the nodes themselves),
    /// via an iterative worklist over the parent relation. Terminates on
    /// cyclic graphs.
    pub fn ancestors(&self, nodes: &[NodeId]) -> FxHashSet<NodeId> {
        self.closure(nodes, |n| self.parents(n))
    }

    /// Descendants of the given nodes (including the nodes themselves)
    pub fn descendants(&self, nodes: &[NodeId]) -> FxHashSet<NodeId> {
        self.closure(nodes, |n| self.children(n))
    }

    fn closure<F>(&self, start: &[NodeId], step: F) -> FxHashSet<NodeId>
    where
        F: Fn(NodeId) -> Vec<Node>,
    {
        let mut visited: FxHashSet<NodeId> = start.iter().copied().collect();
        let mut queue: VecDeque<NodeId> = start.iter().copied().collect();
        while let Some(t) = queue.pop_front() {
            for next in step(t) {
                if visited.insert(next.id) {
                    queue.push_back(next.id);
                }
            }
        }
        visited
    }

    pub fn is_ancestor_of(&self, node1: NodeId, node2: NodeId) -> bool {
        self.ancestors(&[node2]).contains(&node1)
    }

    pub fn is_descendant_of(&self, node1: NodeId, node2: NodeId) -> bool {
        node1 == node2 || self.exists_directed_path(node2, node1)
    }

    /// True if a directed path of length >= 1 runs from `from` to `to`
    pub fn exists_directed_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);
        while let Some(t) = queue.pop_front() {
            for c in self.children(t) {
                if c.id == to {
                    return true;
                }
                if visited.insert(c.id) {
                    queue.push_back(c.id);
                }
            }
        }
        false
    }

    // ---- collider predicates --------------------------------------------

    /// True if the triple x *-> y <-* z is present: both edges at y carry
    /// an arrow at y. "Definite" means the exact endpoint pattern, not
    /// transitive inference.
    pub fn is_def_collider(&self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        let e1 = self.edge_between(x, y);
        let e2 = self.edge_between(y, z);
        match (e1, e2) {
            (Some(e1), Some(e2)) => {
                e1.proximal_endpoint(y) == Some(Endpoint::Arrow)
                    && e2.proximal_endpoint(y) == Some(Endpoint::Arrow)
            }
            _ => false,
        }
    }

    /// True if y is a definite noncollider on the path x *-* y *-* z:
    /// one of the incident edges points away from y toward x or z, or both
    /// endpoints at y are circles and x, z are non-adjacent.
    pub fn is_def_noncollider(&self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        let mut circle_x = false;
        let mut circle_z = false;
        if let Some(list) = self.edge_lists.get(&y) {
            for edge in list {
                let toward_x = edge.distal_node(y).map(|n| n.id) == Some(x);
                let toward_z = edge.distal_node(y).map(|n| n.id) == Some(z);
                if toward_x && edge.points_toward(x) {
                    return true;
                }
                if toward_z && edge.points_toward(z) {
                    return true;
                }
                if toward_x && edge.proximal_endpoint(y) == Some(Endpoint::Circle) {
                    circle_x = true;
                }
                if toward_z && edge.proximal_endpoint(y) == Some(Endpoint::Circle) {
                    circle_z = true;
                }
            }
        }
        circle_x && circle_z && !self.is_adjacent_to(x, z)
    }

    // ---- whole-graph operations -----------------------------------------

    /// Induced subgraph on the given nodes, preserving node identities
    pub fn subgraph(&self, nodes: &[NodeId]) -> GraphResult<EdgeListGraph> {
        let keep: FxHashSet<NodeId> = nodes.iter().copied().collect();
        let mut sub = Self::with_equality(self.equality);
        for node in &self.nodes {
            if keep.contains(&node.id) {
                sub.add_node(node.clone())?;
            }
        }
        for edge in &self.edges {
            if keep.contains(&edge.node1().id) && keep.contains(&edge.node2().id) {
                sub.add_edge(edge.clone())?;
            }
        }
        Ok(sub)
    }

    /// Drop all edges and connect every node pair with #-# edges, where #
    /// is the given endpoint
    pub fn fully_connect(&mut self, endpoint: Endpoint) {
        self.edges.clear();
        for list in self.edge_lists.values_mut() {
            list.clear();
        }
        let nodes = self.nodes.clone();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let edge = Edge::new(nodes[i].clone(), nodes[j].clone(), endpoint, endpoint);
                self.add_edge(edge).expect("nodes are present");
            }
        }
    }

    /// Replace both endpoints of every edge with the given mark
    pub fn reorient_all_with(&mut self, endpoint: Endpoint) {
        let old: Vec<Edge> = self.edges.iter().cloned().collect();
        self.edges.clear();
        for list in self.edge_lists.values_mut() {
            list.clear();
        }
        for edge in old {
            let new_edge = Edge::new(
                edge.node1().clone(),
                edge.node2().clone(),
                endpoint,
                endpoint,
            );
            self.add_edge(new_edge).expect("nodes are present");
        }
    }

    /// Rebuild this graph over new node identities, matching by name.
    /// Names present in the graph but missing from `new_nodes` are an error.
    pub fn replace_nodes(&self, new_nodes: &[Node]) -> GraphResult<EdgeListGraph> {
        let mut converted = Self::with_equality(self.equality);
        let mut by_name: FxHashMap<&str, &Node> = FxHashMap::default();
        for node in new_nodes {
            converted.add_node(node.clone())?;
            by_name.insert(node.name(), node);
        }
        let resolve = |name: &str| -> GraphResult<Node> {
            by_name
                .get(name)
                .map(|n| (*n).clone())
                .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))
        };
        for edge in &self.edges {
            let n1 = resolve(edge.node1().name())?;
            let n2 = resolve(edge.node2().name())?;
            converted.add_edge(Edge::new(n1, n2, edge.endpoint1(), edge.endpoint2()))?;
        }
        for triple in &self.ambiguous_triples {
            let t = Triple::new(
                resolve(triple.x().name())?,
                resolve(triple.y().name())?,
                resolve(triple.z().name())?,
            );
            converted.ambiguous_triples.insert(t);
        }
        Ok(converted)
    }

    // ---- triple bookkeeping ---------------------------------------------

    pub fn add_ambiguous_triple(&mut self, x: &Node, y: &Node, z: &Node) {
        self.ambiguous_triples
            .insert(Triple::new(x.clone(), y.clone(), z.clone()));
    }

    pub fn is_ambiguous_triple(&self, x: &Node, y: &Node, z: &Node) -> bool {
        self.ambiguous_triples
            .contains(&Triple::new(x.clone(), y.clone(), z.clone()))
    }

    pub fn ambiguous_triples(&self) -> &FxHashSet<Triple> {
        &self.ambiguous_triples
    }

    pub fn add_underline_triple(&mut self, x: &Node, y: &Node, z: &Node) {
        self.underline_triples
            .insert(Triple::new(x.clone(), y.clone(), z.clone()));
    }

    pub fn is_underline_triple(&self, x: &Node, y: &Node, z: &Node) -> bool {
        self.underline_triples
            .contains(&Triple::new(x.clone(), y.clone(), z.clone()))
    }

    pub fn underline_triples(&self) -> &FxHashSet<Triple> {
        &self.underline_triples
    }

    pub fn add_dotted_underline_triple(&mut self, x: &Node, y: &Node, z: &Node) {
        self.dotted_underline_triples
            .insert(Triple::new(x.clone(), y.clone(), z.clone()));
    }

    pub fn is_dotted_underline_triple(&self, x: &Node, y: &Node, z: &Node) -> bool {
        self.dotted_underline_triples
            .contains(&Triple::new(x.clone(), y.clone(), z.clone()))
    }

    pub fn dotted_underline_triples(&self) -> &FxHashSet<Triple> {
        &self.dotted_underline_triples
    }

    fn display_name(&self, id: NodeId) -> String {
        self.node(id)
            .map(|n| n.name().to_string())
            .unwrap_or_else(|| format!("{}", id))
    }
}

impl Default for EdgeListGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_nodes() -> (Node, Node, Node) {
        (Node::new("X"), Node::new("Y"), Node::new("Z"))
    }

    fn graph_with(nodes: &[&Node]) -> EdgeListGraph {
        EdgeListGraph::with_nodes(nodes.iter().map(|n| (*n).clone()).collect()).unwrap()
    }

    #[test]
    fn test_add_node_idempotent_and_name_collision() {
        let x = Node::new("X");
        let mut graph = EdgeListGraph::new();
        assert!(graph.add_node(x.clone()).unwrap());
        assert!(!graph.add_node(x.clone()).unwrap());

        let other_x = Node::new("X");
        assert_eq!(
            graph.add_node(other_x),
            Err(GraphError::DuplicateNodeName("X".to_string()))
        );
    }

    #[test]
    fn test_add_edge_idempotent() {
        let (x, y, _) = three_nodes();
        let mut graph = graph_with(&[&x, &y]);
        assert!(graph.add_directed_edge(&x, &y).unwrap());
        assert!(!graph.add_directed_edge(&x, &y).unwrap());
        assert_eq!(graph.num_edges(), 1);

        // The reverse direction is a distinct edge.
        assert!(graph.add_directed_edge(&y, &x).unwrap());
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_add_edge_requires_nodes() {
        let (x, y, _) = three_nodes();
        let mut graph = graph_with(&[&x]);
        assert!(matches!(
            graph.add_directed_edge(&x, &y),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_incidence_agreement() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_undirected_edge(&x, &y).unwrap();
        graph.add_undirected_edge(&y, &z).unwrap();

        assert_eq!(graph.degree(y.id), 2);
        assert_eq!(graph.degree(x.id), 1);

        let edge = graph.edge_between(x.id, y.id).unwrap().clone();
        assert!(graph.remove_edge(&edge));
        assert_eq!(graph.degree(y.id), 1);
        assert_eq!(graph.degree(x.id), 0);
        assert!(!graph.contains_edge(&edge));
    }

    #[test]
    fn test_remove_connecting_edge_ambiguity() {
        let (x, y, _) = three_nodes();
        let mut graph = graph_with(&[&x, &y]);
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_directed_edge(&y, &x).unwrap();
        assert!(matches!(
            graph.remove_connecting_edge(x.id, y.id),
            Err(GraphError::MultipleConnectingEdges(_, _))
        ));
    }

    #[test]
    fn test_set_endpoint() {
        let (x, y, _) = three_nodes();
        let mut graph = graph_with(&[&x, &y]);
        graph.add_undirected_edge(&x, &y).unwrap();

        graph.set_endpoint(x.id, y.id, Endpoint::Arrow).unwrap();
        assert_eq!(graph.get_endpoint(x.id, y.id), Some(Endpoint::Arrow));
        assert_eq!(graph.get_endpoint(y.id, x.id), Some(Endpoint::Tail));
        assert!(graph.is_parent_of(x.id, y.id));

        // Orienting the other end too turns the edge bidirected.
        graph.set_endpoint(y.id, x.id, Endpoint::Arrow).unwrap();
        let edge = graph.edge_between(x.id, y.id).unwrap();
        assert!(crate::graph::edges::is_bidirected(edge));

        let z = Node::new("Z");
        graph.add_node(z.clone()).unwrap();
        assert!(matches!(
            graph.set_endpoint(x.id, z.id, Endpoint::Arrow),
            Err(GraphError::NoConnectingEdge(_, _))
        ));
    }

    #[test]
    fn test_parents_children() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_undirected_edge(&y, &z).unwrap();

        assert_eq!(graph.parents(y.id), vec![x.clone()]);
        assert_eq!(graph.children(x.id), vec![y.clone()]);
        assert!(graph.parents(z.id).is_empty());
        assert!(graph.is_parent_of(x.id, y.id));
        assert!(graph.is_child_of(y.id, x.id));
        assert!(!graph.is_parent_of(y.id, z.id));
    }

    #[test]
    fn test_ancestors_descendants_with_cycle() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        // x -> y -> z -> x: a directed cycle must not hang the closure.
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_directed_edge(&y, &z).unwrap();
        graph.add_directed_edge(&z, &x).unwrap();

        let anc = graph.ancestors(&[y.id]);
        assert!(anc.contains(&x.id) && anc.contains(&y.id) && anc.contains(&z.id));
        let desc = graph.descendants(&[y.id]);
        assert_eq!(desc.len(), 3);
        assert!(graph.is_ancestor_of(z.id, y.id));
        assert!(graph.is_descendant_of(x.id, y.id));
    }

    #[test]
    fn test_def_collider() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_directed_edge(&z, &y).unwrap();
        assert!(graph.is_def_collider(x.id, y.id, z.id));
        assert!(!graph.is_def_noncollider(x.id, y.id, z.id));

        let mut chain = graph_with(&[&x, &y, &z]);
        chain.add_directed_edge(&x, &y).unwrap();
        chain.add_directed_edge(&y, &z).unwrap();
        assert!(!chain.is_def_collider(x.id, y.id, z.id));
        assert!(chain.is_def_noncollider(x.id, y.id, z.id));
    }

    #[test]
    fn test_subgraph() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_undirected_edge(&x, &y).unwrap();
        graph.add_undirected_edge(&y, &z).unwrap();
        graph.add_undirected_edge(&x, &z).unwrap();

        let sub = graph.subgraph(&[x.id, y.id]).unwrap();
        assert_eq!(sub.num_nodes(), 2);
        assert_eq!(sub.num_edges(), 1);
        assert!(sub.is_adjacent_to(x.id, y.id));
        // Identity preserved, not re-created.
        assert_eq!(sub.node_by_name("X").unwrap().id, x.id);
    }

    #[test]
    fn test_fully_connect() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.fully_connect(Endpoint::Tail);
        assert_eq!(graph.num_edges(), 3);
        assert!(graph.is_adjacent_to(x.id, z.id));
    }

    #[test]
    fn test_replace_nodes_matches_by_name() {
        let (x, y, _) = three_nodes();
        let mut graph = graph_with(&[&x, &y]);
        graph.add_directed_edge(&x, &y).unwrap();

        let x2 = Node::new("X");
        let y2 = Node::new("Y");
        let converted = graph.replace_nodes(&[x2.clone(), y2.clone()]).unwrap();
        assert!(converted.is_parent_of(x2.id, y2.id));
        assert!(!converted.is_adjacent_to(x.id, y.id));

        // Names present in the graph but absent from the replacements error.
        assert!(matches!(
            graph.replace_nodes(&[x2]),
            Err(GraphError::NodeNotFound(name)) if name == "Y"
        ));
    }

    #[test]
    fn test_replace_nodes_carries_ambiguous_triples() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_undirected_edge(&x, &y).unwrap();
        graph.add_undirected_edge(&y, &z).unwrap();
        graph.add_ambiguous_triple(&x, &y, &z);

        let (x2, y2, z2) = three_nodes();
        let converted = graph
            .replace_nodes(&[x2.clone(), y2.clone(), z2.clone()])
            .unwrap();
        assert!(converted.is_ambiguous_triple(&x2, &y2, &z2));
        assert_eq!(converted.num_edges(), 2);
    }

    #[test]
    fn test_ambiguous_triples() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_ambiguous_triple(&x, &y, &z);
        assert!(graph.is_ambiguous_triple(&x, &y, &z));
        assert!(graph.is_ambiguous_triple(&z, &y, &x));
        assert_eq!(graph.ambiguous_triples().len(), 1);
    }

    #[test]
    fn test_underline_triples() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_underline_triple(&x, &y, &z);
        graph.add_dotted_underline_triple(&z, &y, &x);
        assert_eq!(graph.underline_triples().len(), 1);
        assert_eq!(graph.dotted_underline_triples().len(), 1);
        // Membership is symmetric in the endpoints.
        assert!(graph.is_underline_triple(&z, &y, &x));
        assert!(graph.is_dotted_underline_triple(&x, &y, &z));
        assert!(!graph.is_underline_triple(&x, &z, &y));
    }

    #[test]
    fn test_from_graph_copies_structure() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_ambiguous_triple(&x, &y, &z);

        let copy = EdgeListGraph::from_graph(&graph).unwrap();
        assert_eq!(copy.node_ids(), graph.node_ids());
        assert!(copy.is_parent_of(x.id, y.id));
        assert!(copy.is_ambiguous_triple(&x, &y, &z));
    }

    #[test]
    fn test_reorient_all_with() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_bidirected_edge(&y, &z).unwrap();
        graph.reorient_all_with(Endpoint::Tail);
        assert!(graph.edges().all(edges::is_undirected));
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_remove_edges() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_undirected_edge(&x, &y).unwrap();
        graph.add_undirected_edge(&y, &z).unwrap();
        let doomed: Vec<Edge> = graph.edges().cloned().collect();
        assert!(graph.remove_edges(&doomed));
        assert_eq!(graph.num_edges(), 0);
        assert!(!graph.is_adjacent_to(x.id, y.id));
    }

    #[test]
    fn test_exists_directed_path() {
        let (x, y, z) = three_nodes();
        let mut graph = graph_with(&[&x, &y, &z]);
        graph.add_directed_edge(&x, &y).unwrap();
        graph.add_directed_edge(&y, &z).unwrap();
        assert!(graph.exists_directed_path(x.id, z.id));
        assert!(!graph.exists_directed_path(z.id, x.id));
        assert!(graph.is_ancestor_of(x.id, z.id));
        assert!(graph.is_descendant_of(z.id, x.id));
    }
}
