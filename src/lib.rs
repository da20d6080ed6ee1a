//! Causal Search
//!
//! Constraint-based causal structure discovery over typed-endpoint graphs.
//!
//! The crate splits into two layers:
//!
//! - [`graph`]: the data model — variable nodes, edges with an endpoint mark
//!   at each end, edge-list storage with incidence indices, kinship and
//!   m-separation queries.
//! - [`search`]: the PC family of algorithms — fast adjacency search over a
//!   pluggable independence test, separating-set bookkeeping, collider
//!   orientation (sepset, conservative, and max-p strategies), Meek's
//!   orientation rules, and the [`search::PcAll`] orchestrator that ties the
//!   stages together.
//!
//! # Example
//!
//! Recover the equivalence class of a collider from a graphical oracle:
//!
//! ```
//! use causal_search::graph::{EdgeListGraph, Node};
//! use causal_search::search::{MsepTest, PcAll};
//!
//! let x = Node::new("X");
//! let y = Node::new("Y");
//! let z = Node::new("Z");
//! let mut truth =
//!     EdgeListGraph::with_nodes(vec![x.clone(), y.clone(), z.clone()]).unwrap();
//! truth.add_directed_edge(&x, &y).unwrap();
//! truth.add_directed_edge(&z, &y).unwrap();
//!
//! let test = MsepTest::new(&truth);
//! let mut pc = PcAll::new(&test);
//! let pattern = pc.search().unwrap();
//!
//! assert!(pattern.is_def_collider(x.id, y.id, z.id));
//! ```

pub mod graph;
pub mod search;

pub use graph::{Edge, EdgeListGraph, Endpoint, GraphError, Node, NodeId, Triple};
pub use search::{
    ColliderDiscovery, ConflictRule, Fas, FasHeuristic, FasType, IndependenceTest, MeekRules,
    MsepTest, PcAll, SearchError, SearchResult, SepsetMap,
};
