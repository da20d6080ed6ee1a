//! Max-p collider orientation.
//!
//! For each unshielded triple a - b - c, find the conditioning set (among
//! subsets of a's or c's neighbors) that maximizes the p-value of the test
//! of a against c. The triple is scored as a collider only when that
//! best-separating set excludes b. Orientations are then applied globally
//! in descending score order, so the most confident colliders claim their
//! edges first.

use crate::graph::{EdgeListGraph, Node, NodeId, Triple};
use crate::search::common::{select, Combinations};
use crate::search::knowledge::{Knowledge, NO_KNOWLEDGE};
use crate::search::orient::{orient_collider, ConflictRule};
use crate::search::test::IndependenceTest;
use crate::search::{SearchError, SearchResult};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::debug;

/// Max-p scoring and orientation of unshielded triples.
pub struct OrientCollidersMaxP<'a, T: IndependenceTest + ?Sized> {
    test: &'a T,
    knowledge: &'a dyn Knowledge,
    depth: i32,
    use_heuristic: bool,
    max_path_length: i32,
    conflict_rule: ConflictRule,
}

impl<'a, T: IndependenceTest + ?Sized> OrientCollidersMaxP<'a, T> {
    pub fn new(test: &'a T) -> Self {
        OrientCollidersMaxP {
            test,
            knowledge: NO_KNOWLEDGE,
            depth: -1,
            use_heuristic: false,
            max_path_length: 3,
            conflict_rule: ConflictRule::default(),
        }
    }

    pub fn set_knowledge(&mut self, knowledge: &'a dyn Knowledge) {
        self.knowledge = knowledge;
    }

    /// Cap on conditioning-set size; -1 means unlimited.
    pub fn set_depth(&mut self, depth: i32) -> SearchResult<()> {
        if depth < -1 {
            return Err(SearchError::InvalidDepth(depth));
        }
        self.depth = depth;
        Ok(())
    }

    /// When enabled, triples whose outer nodes are far apart in the
    /// skeleton are scored by a cheap two-test comparison instead of the
    /// full subset search.
    pub fn set_use_heuristic(&mut self, use_heuristic: bool) {
        self.use_heuristic = use_heuristic;
    }

    pub fn set_max_path_length(&mut self, max_path_length: i32) {
        self.max_path_length = max_path_length;
    }

    pub fn set_conflict_rule(&mut self, conflict_rule: ConflictRule) {
        self.conflict_rule = conflict_rule;
    }

    /// Score all unshielded triples, then orient them in descending score
    /// order subject to knowledge and the conflict rule.
    pub fn orient(&self, graph: &mut EdgeListGraph) -> SearchResult<()> {
        let mut scored: Vec<(Triple, f64)> = Vec::new();
        let nodes: Vec<Node> = graph.nodes().to_vec();
        for b in &nodes {
            let adj = graph.adjacent_nodes(b.id);
            for combo in Combinations::new(adj.len(), 2) {
                let a = &adj[combo[0]];
                let c = &adj[combo[1]];
                if graph.is_adjacent_to(a.id, c.id) {
                    continue;
                }
                let score = if self.use_heuristic
                    && !self.exists_short_path(graph, a.id, c.id)
                {
                    self.score_heuristic(graph, a, b, c)?
                } else {
                    self.score_max_p(graph, a, b, c)?
                };
                if let Some(score) = score {
                    scored.push((Triple::new(a.clone(), b.clone(), c.clone()), score));
                }
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        for (triple, score) in scored {
            debug!("max-p collider candidate {} (score {:.4})", triple, score);
            let (a, b, c) = (triple.x(), triple.y(), triple.z());
            if self.knowledge.is_forbidden(a.name(), b.name())
                || self.knowledge.is_forbidden(c.name(), b.name())
            {
                continue;
            }
            if !graph.is_adjacent_to(a.id, b.id) || !graph.is_adjacent_to(c.id, b.id) {
                continue;
            }
            orient_collider(graph, a, b, c, self.conflict_rule)?;
        }
        Ok(())
    }

    /// Full max-p score: the triple is a collider candidate when the
    /// best-separating subset of adj(a) or adj(c) excludes b. Returns the
    /// maximal p-value in that case.
    fn score_max_p(
        &self,
        graph: &EdgeListGraph,
        a: &Node,
        b: &Node,
        c: &Node,
    ) -> SearchResult<Option<f64>> {
        let mut best_p = f64::NEG_INFINITY;
        let mut best_excludes_b = false;
        let mut found = false;

        for outer in [a, c] {
            let other = if outer.id == a.id { c } else { a };
            let mut neighborhood = graph.adjacent_nodes(outer.id);
            neighborhood.retain(|n| n.id != other.id);
            let bound = if self.depth < 0 {
                neighborhood.len()
            } else {
                (self.depth as usize).min(neighborhood.len())
            };
            for size in 0..=bound {
                for combo in Combinations::new(neighborhood.len(), size) {
                    let z = select(&neighborhood, &combo);
                    let res = self.test.check(a, c, &z)?;
                    if !res.independent {
                        continue;
                    }
                    if res.p_value > best_p {
                        best_p = res.p_value;
                        best_excludes_b = !z.iter().any(|n| n.id == b.id);
                        found = true;
                    }
                }
            }
        }

        if found && best_excludes_b {
            Ok(Some(best_p))
        } else {
            Ok(None)
        }
    }

    /// Cheap score for far-apart outer nodes: compare dependence of a and
    /// c marginally against dependence conditional on b alone.
    fn score_heuristic(
        &self,
        graph: &EdgeListGraph,
        a: &Node,
        b: &Node,
        c: &Node,
    ) -> SearchResult<Option<f64>> {
        if graph.connecting_edges(a.id, b.id).len() > 1
            || graph.connecting_edges(b.id, c.id).len() > 1
        {
            return Ok(None);
        }
        let marginal = self.test.check(a, c, &[])?;
        let conditioned = self.test.check(a, c, std::slice::from_ref(b))?;
        if conditioned.score > marginal.score {
            Ok(Some(conditioned.score.abs()))
        } else {
            Ok(None)
        }
    }

    /// True when the skeleton connects x and z by a path of length in
    /// (2, bound] (unlimited when the bound is -1). The length-2 leg
    /// through the triple's own center never counts.
    fn exists_short_path(&self, graph: &EdgeListGraph, x: NodeId, z: NodeId) -> bool {
        let bound = if self.max_path_length < 0 {
            usize::MAX
        } else {
            self.max_path_length as usize
        };
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
        visited.insert(x);
        queue.push_back((x, 0));
        while let Some((node, dist)) = queue.pop_front() {
            if dist >= bound {
                continue;
            }
            for next in graph.adjacent_nodes(node) {
                if next.id == z {
                    if dist + 1 > 2 {
                        return true;
                    }
                    // z stays out of the visited set so a longer route
                    // to it can still be found.
                    continue;
                }
                if visited.insert(next.id) {
                    queue.push_back((next.id, dist + 1));
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::msep_test::MsepTest;

    #[test]
    fn test_max_p_orients_collider() {
        let x = Node::new("X");
        let y = Node::new("Y");
        let z = Node::new("Z");
        let mut truth =
            EdgeListGraph::with_nodes(vec![x.clone(), y.clone(), z.clone()]).unwrap();
        truth.add_directed_edge(&x, &y).unwrap();
        truth.add_directed_edge(&z, &y).unwrap();
        let test = MsepTest::new(&truth);

        let mut skeleton =
            EdgeListGraph::with_nodes(vec![x.clone(), y.clone(), z.clone()]).unwrap();
        skeleton.add_undirected_edge(&x, &y).unwrap();
        skeleton.add_undirected_edge(&y, &z).unwrap();

        let orienter = OrientCollidersMaxP::new(&test);
        orienter.orient(&mut skeleton).unwrap();
        assert!(skeleton.is_def_collider(x.id, y.id, z.id));
    }

    #[test]
    fn test_max_p_leaves_chain_unoriented() {
        let x = Node::new("X");
        let y = Node::new("Y");
        let z = Node::new("Z");
        let mut truth =
            EdgeListGraph::with_nodes(vec![x.clone(), y.clone(), z.clone()]).unwrap();
        truth.add_directed_edge(&x, &y).unwrap();
        truth.add_directed_edge(&y, &z).unwrap();
        let test = MsepTest::new(&truth);

        let mut skeleton =
            EdgeListGraph::with_nodes(vec![x.clone(), y.clone(), z.clone()]).unwrap();
        skeleton.add_undirected_edge(&x, &y).unwrap();
        skeleton.add_undirected_edge(&y, &z).unwrap();

        let orienter = OrientCollidersMaxP::new(&test);
        orienter.orient(&mut skeleton).unwrap();
        assert!(!skeleton.is_def_collider(x.id, y.id, z.id));
        assert!(crate::graph::edges::is_undirected(
            skeleton.edge_between(x.id, y.id).unwrap()
        ));
    }

    #[test]
    fn test_depth_validation() {
        let truth = EdgeListGraph::new();
        let test = MsepTest::new(&truth);
        let mut orienter = OrientCollidersMaxP::new(&test);
        assert!(matches!(
            orienter.set_depth(-5),
            Err(SearchError::InvalidDepth(-5))
        ));
        assert!(orienter.set_depth(2).is_ok());
    }

    #[test]
    fn test_short_path_detection() {
        let a = Node::new("A");
        let b = Node::new("B");
        let c = Node::new("C");
        let d = Node::new("D");
        let mut g = EdgeListGraph::with_nodes(vec![
            a.clone(),
            b.clone(),
            c.clone(),
            d.clone(),
        ])
        .unwrap();
        g.add_undirected_edge(&a, &b).unwrap();
        g.add_undirected_edge(&b, &c).unwrap();
        g.add_undirected_edge(&c, &d).unwrap();

        let truth = EdgeListGraph::new();
        let test = MsepTest::new(&truth);
        let mut orienter = OrientCollidersMaxP::new(&test);
        orienter.set_max_path_length(3);
        assert!(orienter.exists_short_path(&g, a.id, d.id));
        orienter.set_max_path_length(2);
        assert!(!orienter.exists_short_path(&g, a.id, d.id));
    }

    #[test]
    fn test_short_path_skips_length_two_leg() {
        // A - B - C plus the detour A - D - E - C. The two-step leg
        // through B never counts, so whether a short path exists depends
        // on the detour falling inside the bound.
        let ns: Vec<Node> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|&n| Node::new(n))
            .collect();
        let (a, b, c, d, e) = (&ns[0], &ns[1], &ns[2], &ns[3], &ns[4]);
        let mut g = EdgeListGraph::with_nodes(ns.to_vec()).unwrap();
        g.add_undirected_edge(a, b).unwrap();
        g.add_undirected_edge(b, c).unwrap();

        let truth = EdgeListGraph::new();
        let test = MsepTest::new(&truth);
        let mut orienter = OrientCollidersMaxP::new(&test);
        orienter.set_max_path_length(3);
        assert!(!orienter.exists_short_path(&g, a.id, c.id));

        g.add_undirected_edge(a, d).unwrap();
        g.add_undirected_edge(d, e).unwrap();
        g.add_undirected_edge(e, c).unwrap();
        assert!(orienter.exists_short_path(&g, a.id, c.id));
        orienter.set_max_path_length(2);
        assert!(!orienter.exists_short_path(&g, a.id, c.id));
    }
}
