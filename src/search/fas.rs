//! Fast adjacency search.
//!
//! Starts from the complete undirected graph over the test's variables and
//! removes an edge x - y whenever some conditioning set drawn from the
//! current neighbors of x (or of y) renders the pair independent. Depth d
//! examines conditioning sets of exactly size d; depth 0 is a marginal
//! screen that also records the empty separating set. The surviving
//! skeleton and the separating sets feed the orientation stages.
//!
//! Three evaluation modes share the same semantics at depth 0:
//!
//! - regular: conditioning sets are drawn from the live adjacency, so
//!   removals earlier in a depth level influence later decisions;
//! - stable: each depth level snapshots the adjacency first, making the
//!   output independent of variable order (the PC-stable skeleton);
//! - concurrent: stable semantics with the per-edge decisions at each
//!   level fanned out over a rayon thread pool, removals applied by the
//!   coordinating thread afterwards.

use crate::graph::{EdgeListGraph, Node, NodeId};
use crate::search::common::{independence_fact, select, Combinations};
use crate::search::knowledge::{Knowledge, NO_KNOWLEDGE};
use crate::search::sepset::SepsetMap;
use crate::search::test::IndependenceTest;
use crate::search::{SearchError, SearchResult};
use indexmap::IndexSet;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, info};

/// Cap on the number of depth levels when the depth is unlimited.
const MAX_DEPTH: usize = 1000;

/// Edge-ordering heuristics for the adjacency search.
///
/// They change which conditioning sets get tried first, not which
/// independencies hold, so on an oracle the skeleton is unaffected; on
/// finite-sample tests they trade speed against which of several valid
/// sepsets is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FasHeuristic {
    /// Take variables and neighbors in their given order.
    #[default]
    None,
    /// Sort variables by name up front; neighbor candidates by name.
    SortNodes,
    /// Sort edges by ascending marginal score; neighbor candidates by name.
    SortEdges,
    /// Sort edges by ascending marginal score; neighbor candidates by
    /// descending marginal dependence on the conditioned variable.
    NeighborScore,
}

/// Depth-bounded adjacency search over an independence test.
pub struct Fas<'a, T: IndependenceTest + ?Sized> {
    test: &'a T,
    knowledge: &'a dyn Knowledge,
    seed_graph: Option<&'a EdgeListGraph>,
    depth: i32,
    stable: bool,
    concurrent: bool,
    heuristic: FasHeuristic,
    num_independence_tests: usize,
    num_dependence_judgments: usize,
}

impl<'a, T: IndependenceTest + ?Sized> Fas<'a, T> {
    pub fn new(test: &'a T) -> Self {
        Fas {
            test,
            knowledge: NO_KNOWLEDGE,
            seed_graph: None,
            depth: -1,
            stable: false,
            concurrent: false,
            heuristic: FasHeuristic::None,
            num_independence_tests: 0,
            num_dependence_judgments: 0,
        }
    }

    pub fn set_knowledge(&mut self, knowledge: &'a dyn Knowledge) {
        self.knowledge = knowledge;
    }

    /// Restrict the initial candidate edges to pairs adjacent in `seed`,
    /// matched by name. Pairs outside the seed are dropped without a
    /// separating-set record.
    pub fn set_seed_graph(&mut self, seed: &'a EdgeListGraph) {
        self.seed_graph = Some(seed);
    }

    /// Bound on conditioning-set size; -1 means unlimited.
    pub fn set_depth(&mut self, depth: i32) -> SearchResult<()> {
        if depth < -1 {
            return Err(SearchError::InvalidDepth(depth));
        }
        self.depth = depth;
        Ok(())
    }

    pub fn set_stable(&mut self, stable: bool) {
        self.stable = stable;
    }

    /// Concurrent evaluation implies stable (snapshot) semantics.
    pub fn set_concurrent(&mut self, concurrent: bool) {
        self.concurrent = concurrent;
    }

    pub fn set_heuristic(&mut self, heuristic: FasHeuristic) {
        self.heuristic = heuristic;
    }

    pub fn num_independence_tests(&self) -> usize {
        self.num_independence_tests
    }

    pub fn num_dependence_judgments(&self) -> usize {
        self.num_dependence_judgments
    }

    /// Run the search over all of the test's variables, producing the
    /// undirected skeleton and the separating sets recorded for each
    /// removed edge.
    pub fn search(&mut self) -> SearchResult<(EdgeListGraph, SepsetMap)> {
        self.search_over(self.test.variables().to_vec())
    }

    /// Run the search over a subset of the test's variables.
    pub fn search_over(
        &mut self,
        mut nodes: Vec<Node>,
    ) -> SearchResult<(EdgeListGraph, SepsetMap)> {
        let started = Instant::now();
        self.num_independence_tests = 0;
        self.num_dependence_judgments = 0;

        if matches!(self.heuristic, FasHeuristic::SortNodes) {
            nodes.sort();
        }
        info!(
            num_nodes = nodes.len(),
            depth = self.depth,
            stable = self.stable,
            concurrent = self.concurrent,
            "starting fast adjacency search"
        );

        let node_map: FxHashMap<NodeId, Node> =
            nodes.iter().map(|n| (n.id, n.clone())).collect();
        let mut sepsets = SepsetMap::new();
        let mut adjacencies: FxHashMap<NodeId, IndexSet<NodeId>> =
            nodes.iter().map(|n| (n.id, IndexSet::new())).collect();

        let mut pairs: Vec<(Node, Node)> = Vec::new();
        for i in 0..nodes.len() {
            for j in i + 1..nodes.len() {
                pairs.push((nodes[i].clone(), nodes[j].clone()));
            }
        }
        if let Some(seed) = self.seed_graph {
            pairs.retain(|(x, y)| {
                match (seed.node_by_name(x.name()), seed.node_by_name(y.name())) {
                    (Some(a), Some(b)) => seed.is_adjacent_to(a.id, b.id),
                    _ => false,
                }
            });
        }

        let mut edges = self.screen_marginal(&pairs, &mut adjacencies, &mut sepsets)?;

        if matches!(
            self.heuristic,
            FasHeuristic::SortEdges | FasHeuristic::NeighborScore
        ) {
            let scores = self.marginal_scores(&edges)?;
            edges.sort_by(|a, b| {
                let sa = scores.get(&pair_key(a.0.id, a.1.id)).copied().unwrap_or(0.0);
                let sb = scores.get(&pair_key(b.0.id, b.1.id)).copied().unwrap_or(0.0);
                sa.partial_cmp(&sb).unwrap_or(Ordering::Equal)
            });
            let bound = self.depth_bound();
            for d in 1..=bound {
                self.search_at_depth(d, &edges, &mut adjacencies, &node_map, &scores, &mut sepsets)?;
                if free_degree(&adjacencies) <= d {
                    break;
                }
            }
        } else {
            let scores = FxHashMap::default();
            let bound = self.depth_bound();
            for d in 1..=bound {
                self.search_at_depth(d, &edges, &mut adjacencies, &node_map, &scores, &mut sepsets)?;
                if free_degree(&adjacencies) <= d {
                    break;
                }
            }
        }

        let mut graph = EdgeListGraph::with_nodes(nodes)?;
        for (x, y) in &edges {
            if adjacencies
                .get(&x.id)
                .map_or(false, |adj| adj.contains(&y.id))
            {
                graph.add_undirected_edge(x, y)?;
            }
        }

        info!(
            num_edges = graph.num_edges(),
            tests = self.num_independence_tests,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fast adjacency search finished"
        );
        Ok((graph, sepsets))
    }

    fn depth_bound(&self) -> usize {
        if self.depth < 0 {
            MAX_DEPTH
        } else {
            self.depth as usize
        }
    }

    /// Depth 0: test every candidate pair against the empty set. Pairs that
    /// come out independent, or are forbidden in both directions, never
    /// enter the skeleton and get an empty separating set recorded.
    fn screen_marginal(
        &mut self,
        pairs: &[(Node, Node)],
        adjacencies: &mut FxHashMap<NodeId, IndexSet<NodeId>>,
        sepsets: &mut SepsetMap,
    ) -> SearchResult<Vec<(Node, Node)>> {
        let test = self.test;
        let results = if self.concurrent {
            pairs
                .par_iter()
                .map(|(x, y)| test.check(x, y, &[]))
                .collect::<SearchResult<Vec<_>>>()?
        } else {
            pairs
                .iter()
                .map(|(x, y)| test.check(x, y, &[]))
                .collect::<SearchResult<Vec<_>>>()?
        };
        self.num_independence_tests += pairs.len();

        let mut edges = Vec::new();
        for ((x, y), res) in pairs.iter().zip(results) {
            let forbidden_both = self.knowledge.is_forbidden(x.name(), y.name())
                && self.knowledge.is_forbidden(y.name(), x.name());
            if res.independent || forbidden_both {
                sepsets.set(x.id, y.id, Vec::new());
                debug!("removed: {} (p = {:.4})", independence_fact(x, y, &[]), res.p_value);
            } else {
                self.num_dependence_judgments += 1;
                if let Some(adj) = adjacencies.get_mut(&x.id) {
                    adj.insert(y.id);
                }
                if let Some(adj) = adjacencies.get_mut(&y.id) {
                    adj.insert(x.id);
                }
                edges.push((x.clone(), y.clone()));
            }
        }
        Ok(edges)
    }

    /// Marginal scores for the surviving edges, used by the sorting
    /// heuristics. Re-queries the test; an oracle answers these for free.
    fn marginal_scores(
        &self,
        edges: &[(Node, Node)],
    ) -> SearchResult<FxHashMap<(NodeId, NodeId), f64>> {
        let mut scores = FxHashMap::default();
        for (x, y) in edges {
            let res = self.test.check(x, y, &[])?;
            scores.insert(pair_key(x.id, y.id), res.score);
        }
        Ok(scores)
    }

    fn search_at_depth(
        &mut self,
        depth: usize,
        edges: &[(Node, Node)],
        adjacencies: &mut FxHashMap<NodeId, IndexSet<NodeId>>,
        node_map: &FxHashMap<NodeId, Node>,
        scores: &FxHashMap<(NodeId, NodeId), f64>,
        sepsets: &mut SepsetMap,
    ) -> SearchResult<()> {
        debug!(depth, "searching at depth");
        if self.concurrent {
            let snapshot = adjacencies.clone();
            let test = self.test;
            let knowledge = self.knowledge;
            let heuristic = self.heuristic;
            let outcomes = edges
                .par_iter()
                .map(|(x, y)| -> SearchResult<_> {
                    if !is_adjacent(&snapshot, x.id, y.id) {
                        return Ok((0, 0, None));
                    }
                    let (removal, tests, deps) = check_edge(
                        test, knowledge, &snapshot, node_map, scores, heuristic, depth, x, y,
                    )?;
                    Ok((tests, deps, removal.map(|z| (x.id, y.id, z))))
                })
                .collect::<SearchResult<Vec<_>>>()?;
            for (tests, deps, removal) in outcomes {
                self.num_independence_tests += tests;
                self.num_dependence_judgments += deps;
                if let Some((x, y, z)) = removal {
                    remove_adjacency(adjacencies, x, y);
                    sepsets.set(x, y, z);
                }
            }
        } else {
            let snapshot = if self.stable {
                Some(adjacencies.clone())
            } else {
                None
            };
            for (x, y) in edges {
                if !is_adjacent(adjacencies, x.id, y.id) {
                    continue;
                }
                let view = match &snapshot {
                    Some(s) => s,
                    None => &*adjacencies,
                };
                let (removal, tests, deps) = check_edge(
                    self.test,
                    self.knowledge,
                    view,
                    node_map,
                    scores,
                    self.heuristic,
                    depth,
                    x,
                    y,
                )?;
                self.num_independence_tests += tests;
                self.num_dependence_judgments += deps;
                if let Some(z) = removal {
                    remove_adjacency(adjacencies, x.id, y.id);
                    sepsets.set(x.id, y.id, z);
                }
            }
        }
        Ok(())
    }
}

fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn is_adjacent(
    adjacencies: &FxHashMap<NodeId, IndexSet<NodeId>>,
    x: NodeId,
    y: NodeId,
) -> bool {
    adjacencies.get(&x).map_or(false, |adj| adj.contains(&y))
}

fn remove_adjacency(
    adjacencies: &mut FxHashMap<NodeId, IndexSet<NodeId>>,
    x: NodeId,
    y: NodeId,
) {
    if let Some(adj) = adjacencies.get_mut(&x) {
        adj.shift_remove(&y);
    }
    if let Some(adj) = adjacencies.get_mut(&y) {
        adj.shift_remove(&x);
    }
}

/// The largest number of conditioning candidates any adjacent pair still
/// offers. The depth loop stops once this falls to the current depth.
fn free_degree(adjacencies: &FxHashMap<NodeId, IndexSet<NodeId>>) -> usize {
    adjacencies
        .values()
        .map(|adj| adj.len().saturating_sub(1))
        .max()
        .unwrap_or(0)
}

/// Try to separate x from y conditioning on size-`depth` subsets of x's
/// neighbors, then of y's. The first independence wins.
#[allow(clippy::too_many_arguments)]
fn check_edge<T: IndependenceTest + ?Sized>(
    test: &T,
    knowledge: &dyn Knowledge,
    view: &FxHashMap<NodeId, IndexSet<NodeId>>,
    node_map: &FxHashMap<NodeId, Node>,
    scores: &FxHashMap<(NodeId, NodeId), f64>,
    heuristic: FasHeuristic,
    depth: usize,
    x: &Node,
    y: &Node,
) -> SearchResult<(Option<Vec<Node>>, usize, usize)> {
    let (removal, t1, d1) =
        check_side(test, knowledge, view, node_map, scores, heuristic, depth, x, y)?;
    if removal.is_some() {
        return Ok((removal, t1, d1));
    }
    let (removal, t2, d2) =
        check_side(test, knowledge, view, node_map, scores, heuristic, depth, y, x)?;
    Ok((removal, t1 + t2, d1 + d2))
}

#[allow(clippy::too_many_arguments)]
fn check_side<T: IndependenceTest + ?Sized>(
    test: &T,
    knowledge: &dyn Knowledge,
    view: &FxHashMap<NodeId, IndexSet<NodeId>>,
    node_map: &FxHashMap<NodeId, Node>,
    scores: &FxHashMap<(NodeId, NodeId), f64>,
    heuristic: FasHeuristic,
    depth: usize,
    x: &Node,
    y: &Node,
) -> SearchResult<(Option<Vec<Node>>, usize, usize)> {
    let Some(adjx) = view.get(&x.id) else {
        return Ok((None, 0, 0));
    };
    if !adjx.contains(&y.id) {
        return Ok((None, 0, 0));
    }

    // Candidates are x's other neighbors that knowledge allows as parents
    // of x: not forbidden into x, and x not required into them.
    let mut ppx: Vec<Node> = adjx
        .iter()
        .filter(|&&id| id != y.id)
        .filter_map(|id| node_map.get(id))
        .filter(|z| {
            !knowledge.is_forbidden(z.name(), x.name())
                && !knowledge.is_required(x.name(), z.name())
        })
        .cloned()
        .collect();

    match heuristic {
        FasHeuristic::SortNodes | FasHeuristic::SortEdges => ppx.sort(),
        FasHeuristic::NeighborScore => ppx.sort_by(|a, b| {
            let sa = scores.get(&pair_key(a.id, x.id)).copied().unwrap_or(0.0);
            let sb = scores.get(&pair_key(b.id, x.id)).copied().unwrap_or(0.0);
            sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
        }),
        FasHeuristic::None => {}
    }

    if ppx.len() < depth {
        return Ok((None, 0, 0));
    }

    let mut tests = 0;
    let mut deps = 0;
    for combo in Combinations::new(ppx.len(), depth) {
        let z = select(&ppx, &combo);
        let res = test.check(x, y, &z)?;
        tests += 1;
        if res.independent {
            if knowledge.no_edge_required(x.name(), y.name()) {
                debug!(
                    "removed: {} (p = {:.4})",
                    independence_fact(x, y, &z),
                    res.p_value
                );
                return Ok((Some(z), tests, deps));
            }
        } else {
            deps += 1;
        }
    }
    Ok((None, tests, deps))
}
