//! Background knowledge constraints on edge orientation.
//!
//! Constraints are keyed by variable name so they survive node replacement
//! and apply across graphs that model the same variables. A required edge
//! wins over a forbidden one for the same ordered pair.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Oriented-edge constraints consulted throughout the search.
///
/// Bounds: the concurrent adjacency search consults knowledge from worker
/// threads, so implementations must be `Sync`.
pub trait Knowledge: Sync {
    /// True if the directed edge from -> to is forbidden.
    fn is_forbidden(&self, from: &str, to: &str) -> bool;

    /// True if the directed edge from -> to is required.
    fn is_required(&self, from: &str, to: &str) -> bool;

    /// True if neither direction between x and y is required.
    fn no_edge_required(&self, x: &str, y: &str) -> bool {
        !(self.is_required(x, y) || self.is_required(y, x))
    }

    /// True if no constraints are registered at all.
    fn is_empty(&self) -> bool;

    /// All forbidden ordered pairs, as (from, to) names.
    fn forbidden_edges(&self) -> Vec<(String, String)>;

    /// All required ordered pairs, as (from, to) names.
    fn required_edges(&self) -> Vec<(String, String)>;
}

/// The absence of background knowledge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnowledge;

/// Shared empty-knowledge instance, the default for every search.
pub const NO_KNOWLEDGE: &NoKnowledge = &NoKnowledge;

impl Knowledge for NoKnowledge {
    fn is_forbidden(&self, _from: &str, _to: &str) -> bool {
        false
    }

    fn is_required(&self, _from: &str, _to: &str) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn forbidden_edges(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn required_edges(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Explicit forbidden/required edge lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackgroundKnowledge {
    forbidden: IndexSet<(String, String)>,
    required: IndexSet<(String, String)>,
}

impl BackgroundKnowledge {
    pub fn new() -> Self {
        BackgroundKnowledge::default()
    }

    /// Forbid the directed edge from -> to.
    pub fn forbid(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.forbidden.insert((from.into(), to.into()));
    }

    /// Require the directed edge from -> to.
    pub fn require(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.required.insert((from.into(), to.into()));
    }
}

impl Knowledge for BackgroundKnowledge {
    fn is_forbidden(&self, from: &str, to: &str) -> bool {
        // Required orientations override forbidden ones.
        if self.is_required(from, to) {
            return false;
        }
        self.forbidden.contains(&(from.to_string(), to.to_string()))
    }

    fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&(from.to_string(), to.to_string()))
    }

    fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty()
    }

    fn forbidden_edges(&self) -> Vec<(String, String)> {
        self.forbidden.iter().cloned().collect()
    }

    fn required_edges(&self) -> Vec<(String, String)> {
        self.required.iter().cloned().collect()
    }
}
