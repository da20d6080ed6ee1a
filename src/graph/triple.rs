//! Triple of nodes (x, y, z), used to mark graphs during orientation.
//!
//! Note that (x, y, z) = (z, y, x).

use super::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An unordered-at-the-ends triple of nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triple {
    x: Node,
    y: Node,
    z: Node,
}

impl Triple {
    pub fn new(x: Node, y: Node, z: Node) -> Self {
        Triple { x, y, z }
    }

    pub fn x(&self) -> &Node {
        &self.x
    }

    pub fn y(&self) -> &Node {
        &self.y
    }

    pub fn z(&self) -> &Node {
        &self.z
    }
}

impl PartialEq for Triple {
    fn eq(&self, other: &Self) -> bool {
        self.y == other.y
            && ((self.x == other.x && self.z == other.z)
                || (self.x == other.z && self.z == other.x))
    }
}

impl Eq for Triple {}

impl std::hash::Hash for Triple {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let (lo, hi) = if self.x.id <= self.z.id {
            (self.x.id, self.z.id)
        } else {
            (self.z.id, self.x.id)
        };
        lo.hash(state);
        self.y.id.hash(state);
        hi.hash(state);
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_symmetric_ends() {
        let x = Node::new("X");
        let y = Node::new("Y");
        let z = Node::new("Z");
        let t1 = Triple::new(x.clone(), y.clone(), z.clone());
        let t2 = Triple::new(z.clone(), y.clone(), x.clone());
        assert_eq!(t1, t2);

        let mut set = HashSet::new();
        set.insert(t1);
        assert!(set.contains(&t2));

        // A different middle node is a different triple.
        let t3 = Triple::new(x, z, y);
        assert!(!set.contains(&t3));
    }
}
