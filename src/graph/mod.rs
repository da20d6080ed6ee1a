//! Typed-endpoint graph model for causal structure search
//!
//! This module implements the graph layer the search algorithms run on:
//! - Variable nodes with stable identities and display names
//! - Edges with an endpoint mark at each end (tail, arrow, circle, star)
//! - Edge-list storage with per-node incidence indices
//! - Kinship queries (parents, children, ancestors, descendants)
//! - m-separation reachability for graphical independence oracles

pub mod edge;
pub mod edges;
pub mod msep;
pub mod node;
pub mod store;
pub mod triple;
pub mod types;

// Re-export main types
pub use edge::{Edge, EdgeKind, EdgeProperty, EdgeTypeProbability};
pub use msep::{is_m_connected, is_m_separated};
pub use node::Node;
pub use store::{EdgeListGraph, GraphError, GraphResult};
pub use triple::Triple;
pub use types::{Endpoint, NodeEquality, NodeId, NodeType, VariableType};
