//! Meek's orientation rules.
//!
//! Propagates collider orientations to the rest of the pattern: repeatedly
//! applies rules R1 through R4 to undirected edges until no rule fires.
//! The fixed point is the completed pattern for the equivalence class.
//! An optional pre-pass reverts directed edges that are not part of an
//! unshielded collider back to undirected, so propagation starts from
//! exactly the collider evidence.

use crate::graph::{edges, EdgeListGraph, GraphResult, Node, NodeId};
use crate::search::knowledge::{Knowledge, NO_KNOWLEDGE};
use crate::search::orient::is_arrowpoint_allowed;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Rule engine for orientation propagation.
pub struct MeekRules<'a> {
    knowledge: &'a dyn Knowledge,
    revert_to_unshielded_colliders: bool,
}

impl<'a> MeekRules<'a> {
    pub fn new() -> Self {
        MeekRules {
            knowledge: NO_KNOWLEDGE,
            revert_to_unshielded_colliders: true,
        }
    }

    pub fn set_knowledge(&mut self, knowledge: &'a dyn Knowledge) {
        self.knowledge = knowledge;
    }

    pub fn set_revert_to_unshielded_colliders(&mut self, revert: bool) {
        self.revert_to_unshielded_colliders = revert;
    }

    /// Run the rules to fixed point. Returns the nodes whose edges were
    /// touched.
    pub fn orient_implied(&self, graph: &mut EdgeListGraph) -> GraphResult<FxHashSet<NodeId>> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        if self.revert_to_unshielded_colliders {
            self.revert(graph, &mut visited)?;
        }

        loop {
            let mut changed = false;
            let undirected: Vec<(Node, Node)> = graph
                .edges()
                .filter(|e| edges::is_undirected(e))
                .map(|e| (e.node1().clone(), e.node2().clone()))
                .collect();
            for (x, y) in undirected {
                // An earlier rule in this sweep may have claimed the edge.
                let still_undirected = graph
                    .edge_between(x.id, y.id)
                    .map_or(false, edges::is_undirected);
                if !still_undirected {
                    continue;
                }
                if self.rule1(graph, &x, &y, &mut visited)?
                    || self.rule1(graph, &y, &x, &mut visited)?
                    || self.rule2(graph, &x, &y, &mut visited)?
                    || self.rule2(graph, &y, &x, &mut visited)?
                    || self.rule3(graph, &x, &y, &mut visited)?
                    || self.rule3(graph, &y, &x, &mut visited)?
                    || self.rule4(graph, &x, &y, &mut visited)?
                    || self.rule4(graph, &y, &x, &mut visited)?
                {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(visited)
    }

    /// Undo directed edges that no unshielded collider accounts for,
    /// unless knowledge pins the orientation down.
    fn revert(
        &self,
        graph: &mut EdgeListGraph,
        visited: &mut FxHashSet<NodeId>,
    ) -> GraphResult<()> {
        loop {
            let mut changed = false;
            let nodes: Vec<Node> = graph.nodes().to_vec();
            for y in &nodes {
                let parents = graph.parents(y.id);
                'parent: for p in &parents {
                    for q in &parents {
                        if q.id != p.id && !graph.is_adjacent_to(p.id, q.id) {
                            // p participates in an unshielded collider at y.
                            continue 'parent;
                        }
                    }
                    if self.knowledge.is_required(p.name(), y.name())
                        || self.knowledge.is_forbidden(y.name(), p.name())
                    {
                        continue;
                    }
                    graph.remove_connecting_edge(p.id, y.id)?;
                    graph.add_undirected_edge(p, y)?;
                    visited.insert(p.id);
                    visited.insert(y.id);
                    debug!("reverted {} -> {} to undirected", p, y);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }

    /// R1: a -> b, b - c, a and c nonadjacent, orients b -> c.
    fn rule1(
        &self,
        graph: &mut EdgeListGraph,
        b: &Node,
        c: &Node,
        visited: &mut FxHashSet<NodeId>,
    ) -> GraphResult<bool> {
        for a in graph.parents(b.id) {
            if a.id == c.id || graph.is_adjacent_to(a.id, c.id) {
                continue;
            }
            return self.direct(graph, b, c, visited);
        }
        Ok(false)
    }

    /// R2: a -> b -> c with a - c, orients a -> c.
    fn rule2(
        &self,
        graph: &mut EdgeListGraph,
        a: &Node,
        c: &Node,
        visited: &mut FxHashSet<NodeId>,
    ) -> GraphResult<bool> {
        for b in graph.children(a.id) {
            if b.id == c.id {
                continue;
            }
            if graph.is_parent_of(b.id, c.id) {
                return self.direct(graph, a, c, visited);
            }
        }
        Ok(false)
    }

    /// R3: d - a, d - b, d - c, b -> a, c -> a, b and c nonadjacent,
    /// orients d -> a.
    fn rule3(
        &self,
        graph: &mut EdgeListGraph,
        d: &Node,
        a: &Node,
        visited: &mut FxHashSet<NodeId>,
    ) -> GraphResult<bool> {
        let spouses: Vec<Node> = graph
            .parents(a.id)
            .into_iter()
            .filter(|p| {
                graph
                    .edge_between(d.id, p.id)
                    .map_or(false, edges::is_undirected)
            })
            .collect();
        for i in 0..spouses.len() {
            for j in i + 1..spouses.len() {
                if !graph.is_adjacent_to(spouses[i].id, spouses[j].id) {
                    return self.direct(graph, d, a, visited);
                }
            }
        }
        Ok(false)
    }

    /// R4: a - b, with d adjacent to a, d -> c -> b, a and c nonadjacent,
    /// orients a -> b. Only consulted when background knowledge exists.
    fn rule4(
        &self,
        graph: &mut EdgeListGraph,
        a: &Node,
        b: &Node,
        visited: &mut FxHashSet<NodeId>,
    ) -> GraphResult<bool> {
        if self.knowledge.is_empty() {
            return Ok(false);
        }
        for c in graph.parents(b.id) {
            if c.id == a.id || graph.is_adjacent_to(a.id, c.id) {
                continue;
            }
            for d in graph.parents(c.id) {
                if graph.is_adjacent_to(d.id, a.id) {
                    return self.direct(graph, a, b, visited);
                }
            }
        }
        Ok(false)
    }

    fn direct(
        &self,
        graph: &mut EdgeListGraph,
        from: &Node,
        to: &Node,
        visited: &mut FxHashSet<NodeId>,
    ) -> GraphResult<bool> {
        if !is_arrowpoint_allowed(from, to, self.knowledge) {
            return Ok(false);
        }
        graph.remove_connecting_edge(from.id, to.id)?;
        graph.add_directed_edge(from, to)?;
        visited.insert(from.id);
        visited.insert(to.id);
        debug!("meek: oriented {} -> {}", from, to);
        Ok(true)
    }
}

impl Default for MeekRules<'_> {
    fn default() -> Self {
        MeekRules::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::knowledge::BackgroundKnowledge;

    fn nodes(names: &[&str]) -> Vec<Node> {
        names.iter().map(|&n| Node::new(n)).collect()
    }

    #[test]
    fn test_rule1_propagates_from_collider() {
        // X -> Y <- Z with Y - W: R1 orients Y -> W.
        let ns = nodes(&["X", "Y", "Z", "W"]);
        let (x, y, z, w) = (&ns[0], &ns[1], &ns[2], &ns[3]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(x, y).unwrap();
        g.add_directed_edge(z, y).unwrap();
        g.add_undirected_edge(y, w).unwrap();

        let rules = MeekRules::new();
        let visited = rules.orient_implied(&mut g).unwrap();
        assert!(g.is_parent_of(y.id, w.id));
        assert!(visited.contains(&w.id));
    }

    #[test]
    fn test_rule2_closes_triangle() {
        // A -> B -> C with A - C in a shielded triple: R2 orients A -> C.
        let ns = nodes(&["A", "B", "C"]);
        let (a, b, c) = (&ns[0], &ns[1], &ns[2]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(a, b).unwrap();
        g.add_directed_edge(b, c).unwrap();
        g.add_undirected_edge(a, c).unwrap();

        let mut rules = MeekRules::new();
        // The chain is shielded, so keep it instead of reverting.
        rules.set_revert_to_unshielded_colliders(false);
        rules.orient_implied(&mut g).unwrap();
        assert!(g.is_parent_of(a.id, c.id));
    }

    #[test]
    fn test_rule3_orients_hub() {
        // B -> A <- C (unshielded), D undirected to all three: D -> A.
        let ns = nodes(&["A", "B", "C", "D"]);
        let (a, b, c, d) = (&ns[0], &ns[1], &ns[2], &ns[3]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(b, a).unwrap();
        g.add_directed_edge(c, a).unwrap();
        g.add_undirected_edge(d, a).unwrap();
        g.add_undirected_edge(d, b).unwrap();
        g.add_undirected_edge(d, c).unwrap();

        let rules = MeekRules::new();
        rules.orient_implied(&mut g).unwrap();
        assert!(g.is_parent_of(d.id, a.id));
    }

    #[test]
    fn test_revert_undoes_unsupported_orientation() {
        // A lone directed edge has no collider justifying it.
        let ns = nodes(&["A", "B"]);
        let (a, b) = (&ns[0], &ns[1]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(a, b).unwrap();

        let rules = MeekRules::new();
        rules.orient_implied(&mut g).unwrap();
        assert!(edges::is_undirected(g.edge_between(a.id, b.id).unwrap()));
    }

    #[test]
    fn test_revert_keeps_collider() {
        let ns = nodes(&["X", "Y", "Z"]);
        let (x, y, z) = (&ns[0], &ns[1], &ns[2]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(x, y).unwrap();
        g.add_directed_edge(z, y).unwrap();

        let rules = MeekRules::new();
        rules.orient_implied(&mut g).unwrap();
        assert!(g.is_def_collider(x.id, y.id, z.id));
    }

    #[test]
    fn test_revert_respects_required_edge() {
        let ns = nodes(&["A", "B"]);
        let (a, b) = (&ns[0], &ns[1]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(a, b).unwrap();

        let mut knowledge = BackgroundKnowledge::new();
        knowledge.require("A", "B");
        let mut rules = MeekRules::new();
        rules.set_knowledge(&knowledge);
        rules.orient_implied(&mut g).unwrap();
        assert!(g.is_parent_of(a.id, b.id));
    }

    #[test]
    fn test_idempotent_at_fixed_point() {
        let ns = nodes(&["X", "Y", "Z", "W"]);
        let (x, y, z, w) = (&ns[0], &ns[1], &ns[2], &ns[3]);
        let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
        g.add_directed_edge(x, y).unwrap();
        g.add_directed_edge(z, y).unwrap();
        g.add_undirected_edge(y, w).unwrap();

        let rules = MeekRules::new();
        rules.orient_implied(&mut g).unwrap();
        let first: Vec<_> = g.edges().cloned().collect();
        rules.orient_implied(&mut g).unwrap();
        let second: Vec<_> = g.edges().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rule4_requires_knowledge() {
        // d -> c -> b, a - b, a - d, a and c nonadjacent.
        let ns = nodes(&["A", "B", "C", "D"]);
        let (a, b, c, d) = (&ns[0], &ns[1], &ns[2], &ns[3]);

        let build = || {
            let mut g = EdgeListGraph::with_nodes(ns.clone()).unwrap();
            g.add_directed_edge(d, c).unwrap();
            g.add_directed_edge(c, b).unwrap();
            g.add_undirected_edge(a, b).unwrap();
            g.add_undirected_edge(a, d).unwrap();
            g
        };

        // Without knowledge R1 settles the kite as B -> A.
        let mut g1 = build();
        let mut rules = MeekRules::new();
        rules.set_revert_to_unshielded_colliders(false);
        rules.orient_implied(&mut g1).unwrap();
        assert!(g1.is_parent_of(b.id, a.id));

        // Knowledge blocking B -> A silences R1; R4 then orients A -> B.
        let mut g2 = build();
        let mut knowledge = BackgroundKnowledge::new();
        knowledge.forbid("B", "A");
        let mut with_k = MeekRules::new();
        with_k.set_knowledge(&knowledge);
        with_k.set_revert_to_unshielded_colliders(false);
        with_k.orient_implied(&mut g2).unwrap();
        assert!(g2.is_parent_of(a.id, b.id));
    }
}
