//! Separating-set bookkeeping for adjacency search.

use crate::graph::{Node, NodeId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Map from unordered node pairs to the conditioning set that rendered them
/// independent. A recorded empty set is distinct from no record at all: the
/// former says "independent given nothing", the latter says "never
/// separated".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SepsetMap {
    sepsets: FxHashMap<(NodeId, NodeId), Vec<Node>>,
}

impl SepsetMap {
    pub fn new() -> Self {
        SepsetMap::default()
    }

    fn key(x: NodeId, y: NodeId) -> (NodeId, NodeId) {
        if x <= y {
            (x, y)
        } else {
            (y, x)
        }
    }

    /// Record the separating set for the pair, replacing any earlier record.
    pub fn set(&mut self, x: NodeId, y: NodeId, z: Vec<Node>) {
        self.sepsets.insert(Self::key(x, y), z);
    }

    /// The recorded separating set, or None if the pair was never separated.
    pub fn get(&self, x: NodeId, y: NodeId) -> Option<&[Node]> {
        self.sepsets.get(&Self::key(x, y)).map(Vec::as_slice)
    }

    pub fn contains(&self, x: NodeId, y: NodeId) -> bool {
        self.sepsets.contains_key(&Self::key(x, y))
    }

    pub fn len(&self) -> usize {
        self.sepsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sepsets.is_empty()
    }
}
