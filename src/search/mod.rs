//! Constraint-based causal structure search
//!
//! The PC family: a depth-bounded fast adjacency search driven by a
//! pluggable conditional-independence test, followed by collider
//! orientation (from recorded separating sets, conservatively, or by
//! max-p scoring) and Meek's orientation rules. [`PcAll`] sequences the
//! stages; the pieces are usable on their own.

pub mod common;
pub mod fas;
pub mod knowledge;
pub mod max_p;
pub mod meek;
pub mod orient;
pub mod pc;
pub mod sepset;

pub use fas::{Fas, FasHeuristic};
pub use knowledge::{BackgroundKnowledge, Knowledge, NoKnowledge, NO_KNOWLEDGE};
pub use max_p::OrientCollidersMaxP;
pub use meek::MeekRules;
pub use msep_test::MsepTest;
pub use orient::{ConflictRule, ConservativeOutcome};
pub use pc::{ColliderDiscovery, FasType, PcAll};
pub use sepset::SepsetMap;
pub use test::{IndependenceResult, IndependenceTest};

use crate::graph::GraphError;
use thiserror::Error;

/// Errors produced by the search algorithms
#[derive(Error, Debug)]
pub enum SearchError {
    /// Depth parameters accept -1 (unlimited) or a non-negative bound
    #[error("depth must be -1 (unlimited) or >= 0, got {0}")]
    InvalidDepth(i32),

    /// A node handed to the search is not covered by the independence test
    #[error("node '{0}' is not a variable of the independence test")]
    OutsideDomain(String),

    /// The independence test itself failed
    #[error("independence test error: {0}")]
    Test(String),

    /// A graph operation failed
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;
