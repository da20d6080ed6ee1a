//! Node implementation for causal graphs
//!
//! A node is a named variable with a role tag (measured, latent, error,
//! selection) and optional layout coordinates. Names are unique within one
//! graph; ids are unique within the process.

use super::types::{NodeId, NodeType, VariableType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A variable that can serve as a node in a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Process-unique identifier
    pub id: NodeId,

    /// Variable name, unique within a graph
    pub name: String,

    /// Role of this node in the causal model
    pub node_type: NodeType,

    /// Domain variable vs. intervention marker
    pub variable_type: VariableType,

    /// Optional 2-D layout coordinates for display
    pub center: Option<(i32, i32)>,
}

impl Node {
    /// Create a new measured domain variable with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            id: NodeId::new(NEXT_NODE_ID.fetch_add(1, AtomicOrdering::Relaxed)),
            name: name.into(),
            node_type: NodeType::Measured,
            variable_type: VariableType::Domain,
            center: None,
        }
    }

    /// Create a new node with an explicit role
    pub fn with_type(name: impl Into<String>, node_type: NodeType) -> Self {
        let mut node = Node::new(name);
        node.node_type = node_type;
        node
    }

    /// Create a new node of the same type as this one, with the given name
    pub fn like(&self, name: impl Into<String>) -> Self {
        let mut node = Node::new(name);
        node.node_type = self.node_type;
        node.variable_type = self.variable_type;
        node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_center(&mut self, x: i32, y: i32) {
        self.center = Some((x, y));
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Name order first so that name-sorted node lists are deterministic even
// when two graphs hold like-named nodes with different ids.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name).then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids() {
        let x = Node::new("X");
        let y = Node::new("X");
        assert_ne!(x.id, y.id);
        assert_ne!(x, y); // same name, different identity
    }

    #[test]
    fn test_like_preserves_type() {
        let latent = Node::with_type("L1", NodeType::Latent);
        let l2 = latent.like("L2");
        assert_eq!(l2.node_type, NodeType::Latent);
        assert_eq!(l2.name(), "L2");
        assert_ne!(l2.id, latent.id);
    }

    #[test]
    fn test_name_ordering() {
        let a = Node::new("A");
        let b = Node::new("B");
        let mut nodes = vec![b.clone(), a.clone()];
        nodes.sort();
        assert_eq!(nodes[0].name(), "A");
        assert_eq!(nodes[1].name(), "B");
    }
}
