//! Core type definitions for the causal graph model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
///
/// Ids are process-unique: two nodes created independently never share an
/// id, even across graphs. This is what "object identity" means for the
/// [`NodeEquality::ById`] policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// The role a node plays in a causal model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Measured,
    Latent,
    Error,
    Selection,
}

/// Whether a variable is a domain variable or part of an intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    Domain,
    InterventionStatus,
    InterventionValue,
}

/// How an edge meets a node.
///
/// Tails, arrows, and circles are the marks of CPDAG/PAG-style graphs: a
/// directed edge is Tail-at-parent / Arrow-at-child, an undirected edge is
/// Tail/Tail, and so on. Star and Null are wildcard/absent marks used by
/// display code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
    Star,
    Null,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Tail => "TAIL",
            Endpoint::Arrow => "ARROW",
            Endpoint::Circle => "CIRCLE",
            Endpoint::Star => "STAR",
            Endpoint::Null => "NULL",
        };
        write!(f, "{}", name)
    }
}

/// Node-comparison policy owned by each graph.
///
/// `ById` compares node identities; `ByName` treats two nodes with the same
/// name as the same variable, which is what cross-graph transfer wants. A
/// policy value per graph replaces the process-wide mode switch that search
/// implementations in this literature tend to carry, so two graphs with
/// different policies can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeEquality {
    ById,
    #[default]
    ByName,
}
