//! The PC algorithm family, under one roof.
//!
//! Runs the pipeline: fast adjacency search, knowledge-forced
//! orientations, one of three collider-discovery strategies, then Meek's
//! rules to the completed pattern. The combination of switches covers
//! plain PC, PC-stable, CPC, and PC-max.

use crate::graph::{EdgeListGraph, Node, Triple};
use crate::search::fas::{Fas, FasHeuristic};
use crate::search::knowledge::{Knowledge, NO_KNOWLEDGE};
use crate::search::max_p::OrientCollidersMaxP;
use crate::search::meek::MeekRules;
use crate::search::orient::{
    orient_colliders_conservative, orient_colliders_from_sepsets, orient_from_knowledge,
    ConflictRule,
};
use crate::search::sepset::SepsetMap;
use crate::search::test::IndependenceTest;
use crate::search::{SearchError, SearchResult};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Which adjacency-search semantics to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FasType {
    /// Removals within a depth level feed later decisions.
    Regular,
    /// Each depth level works from a snapshot (PC-stable).
    #[default]
    Stable,
}

/// How colliders are discovered after the skeleton is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColliderDiscovery {
    /// Straight from the separating sets the adjacency search recorded.
    #[default]
    FasSepsets,
    /// Conservative: re-test all candidate sepsets, mark disagreements
    /// ambiguous.
    Conservative,
    /// Score triples by maximal p-value, orient best-first.
    MaxP,
}

/// Configurable PC search.
pub struct PcAll<'a, T: IndependenceTest + ?Sized> {
    test: &'a T,
    knowledge: &'a dyn Knowledge,
    seed_graph: Option<&'a EdgeListGraph>,
    fas_type: FasType,
    concurrent: bool,
    collider_discovery: ColliderDiscovery,
    conflict_rule: ConflictRule,
    heuristic: FasHeuristic,
    depth: i32,
    use_max_p_heuristic: bool,
    max_p_path_length: i32,
    elapsed: Duration,
    num_independence_tests: usize,
    sepsets: Option<SepsetMap>,
    collider_triples: Vec<Triple>,
    noncollider_triples: Vec<Triple>,
    ambiguous_triples: Vec<Triple>,
}

impl<'a, T: IndependenceTest + ?Sized> PcAll<'a, T> {
    pub fn new(test: &'a T) -> Self {
        PcAll {
            test,
            knowledge: NO_KNOWLEDGE,
            seed_graph: None,
            fas_type: FasType::default(),
            concurrent: false,
            collider_discovery: ColliderDiscovery::default(),
            conflict_rule: ConflictRule::default(),
            heuristic: FasHeuristic::default(),
            depth: -1,
            use_max_p_heuristic: false,
            max_p_path_length: 3,
            elapsed: Duration::ZERO,
            num_independence_tests: 0,
            sepsets: None,
            collider_triples: Vec::new(),
            noncollider_triples: Vec::new(),
            ambiguous_triples: Vec::new(),
        }
    }

    pub fn set_knowledge(&mut self, knowledge: &'a dyn Knowledge) {
        self.knowledge = knowledge;
    }

    pub fn set_seed_graph(&mut self, seed: &'a EdgeListGraph) {
        self.seed_graph = Some(seed);
    }

    pub fn set_fas_type(&mut self, fas_type: FasType) {
        self.fas_type = fas_type;
    }

    /// Evaluate adjacency-search depth levels on a thread pool. Implies
    /// stable semantics.
    pub fn set_concurrent(&mut self, concurrent: bool) {
        self.concurrent = concurrent;
    }

    pub fn set_collider_discovery(&mut self, discovery: ColliderDiscovery) {
        self.collider_discovery = discovery;
    }

    pub fn set_conflict_rule(&mut self, rule: ConflictRule) {
        self.conflict_rule = rule;
    }

    pub fn set_heuristic(&mut self, heuristic: FasHeuristic) {
        self.heuristic = heuristic;
    }

    /// Bound on conditioning-set size; -1 means unlimited.
    pub fn set_depth(&mut self, depth: i32) -> SearchResult<()> {
        if depth < -1 {
            return Err(SearchError::InvalidDepth(depth));
        }
        self.depth = depth;
        Ok(())
    }

    /// Short-path heuristic for max-p collider discovery.
    pub fn set_use_max_p_heuristic(&mut self, use_heuristic: bool) {
        self.use_max_p_heuristic = use_heuristic;
    }

    pub fn set_max_p_path_length(&mut self, length: i32) {
        self.max_p_path_length = length;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn num_independence_tests(&self) -> usize {
        self.num_independence_tests
    }

    /// Separating sets from the adjacency search of the last run.
    pub fn sepsets(&self) -> Option<&SepsetMap> {
        self.sepsets.as_ref()
    }

    pub fn collider_triples(&self) -> &[Triple] {
        &self.collider_triples
    }

    pub fn noncollider_triples(&self) -> &[Triple] {
        &self.noncollider_triples
    }

    pub fn ambiguous_triples(&self) -> &[Triple] {
        &self.ambiguous_triples
    }

    /// Search over all of the test's variables.
    pub fn search(&mut self) -> SearchResult<EdgeListGraph> {
        let nodes = self.test.variables().to_vec();
        self.search_over(nodes)
    }

    /// Search over a subset of the test's variables.
    pub fn search_over(&mut self, nodes: Vec<Node>) -> SearchResult<EdgeListGraph> {
        for node in &nodes {
            let known = self
                .test
                .variables()
                .iter()
                .any(|v| v.id == node.id || v.name() == node.name());
            if !known {
                return Err(SearchError::OutsideDomain(node.name().to_string()));
            }
        }

        let started = Instant::now();
        info!(
            num_nodes = nodes.len(),
            fas_type = ?self.fas_type,
            discovery = ?self.collider_discovery,
            "starting PC search"
        );
        self.collider_triples.clear();
        self.noncollider_triples.clear();
        self.ambiguous_triples.clear();

        let mut fas = Fas::new(self.test);
        fas.set_knowledge(self.knowledge);
        fas.set_depth(self.depth)?;
        fas.set_stable(matches!(self.fas_type, FasType::Stable));
        fas.set_concurrent(self.concurrent);
        fas.set_heuristic(self.heuristic);
        if let Some(seed) = self.seed_graph {
            fas.set_seed_graph(seed);
        }
        let (mut graph, sepsets) = fas.search_over(nodes)?;
        self.num_independence_tests = fas.num_independence_tests();

        orient_from_knowledge(&mut graph, self.knowledge)?;

        match self.collider_discovery {
            ColliderDiscovery::FasSepsets => {
                self.collider_triples = orient_colliders_from_sepsets(
                    &mut graph,
                    &sepsets,
                    self.knowledge,
                    self.conflict_rule,
                )?;
            }
            ColliderDiscovery::Conservative => {
                let outcome = orient_colliders_conservative(
                    &mut graph,
                    self.test,
                    self.knowledge,
                    self.conflict_rule,
                )?;
                self.collider_triples = outcome.colliders;
                self.noncollider_triples = outcome.noncolliders;
                self.ambiguous_triples = outcome.ambiguous;
            }
            ColliderDiscovery::MaxP => {
                let mut orienter = OrientCollidersMaxP::new(self.test);
                orienter.set_knowledge(self.knowledge);
                orienter.set_depth(self.depth)?;
                orienter.set_use_heuristic(self.use_max_p_heuristic);
                orienter.set_max_path_length(self.max_p_path_length);
                orienter.set_conflict_rule(self.conflict_rule);
                orienter.orient(&mut graph)?;
            }
        }

        let mut meek = MeekRules::new();
        meek.set_knowledge(self.knowledge);
        meek.orient_implied(&mut graph)?;

        self.sepsets = Some(sepsets);
        self.elapsed = started.elapsed();
        self.log_triples();
        info!(
            num_edges = graph.num_edges(),
            tests = self.num_independence_tests,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "PC search finished"
        );
        Ok(graph)
    }

    fn log_triples(&self) {
        for t in &self.collider_triples {
            debug!("collider: {}", t);
        }
        for t in &self.noncollider_triples {
            debug!("noncollider: {}", t);
        }
        for t in &self.ambiguous_triples {
            debug!("ambiguous: {}", t);
        }
    }
}
