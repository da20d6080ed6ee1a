//! Collider orientation.
//!
//! Given a skeleton and evidence about separating sets, decide which
//! unshielded triples x - y - z (x, z nonadjacent) are colliders
//! x -> y <- z. Two strategies live here: orientation straight from the
//! recorded separating sets, and the conservative rule that re-tests all
//! candidate sepsets and marks disagreements ambiguous. Max-p scoring has
//! its own module.

use crate::graph::{EdgeListGraph, Endpoint, GraphResult, Node, Triple};
use crate::search::common::{select, Combinations};
use crate::search::knowledge::Knowledge;
use crate::search::sepset::SepsetMap;
use crate::search::test::IndependenceTest;
use crate::search::SearchResult;
use tracing::debug;

/// What to do when a collider orientation collides with an existing
/// arrow at the center node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictRule {
    /// First orientation wins: skip if either edge already carries an
    /// arrow into the center.
    Priority,
    /// Record the conflict as bidirected endpoints.
    Bidirected,
    /// Last orientation wins: replace both edges with directed ones.
    #[default]
    Overwrite,
}

/// True if knowledge permits adding an arrowpoint at `to` on the edge
/// from `from`: the reverse direction is not required and this direction
/// is not forbidden.
pub fn is_arrowpoint_allowed(from: &Node, to: &Node, knowledge: &dyn Knowledge) -> bool {
    !knowledge.is_required(to.name(), from.name())
        && !knowledge.is_forbidden(from.name(), to.name())
}

/// Orient x -> y <- z under the given conflict rule.
pub fn orient_collider(
    graph: &mut EdgeListGraph,
    x: &Node,
    y: &Node,
    z: &Node,
    rule: ConflictRule,
) -> GraphResult<()> {
    match rule {
        ConflictRule::Priority => {
            if graph.get_endpoint(x.id, y.id) == Some(Endpoint::Arrow)
                || graph.get_endpoint(z.id, y.id) == Some(Endpoint::Arrow)
            {
                debug!("collider {} -> {} <- {} skipped, arrow already at {}", x, y, z, y);
                return Ok(());
            }
            replace_directed(graph, x, y)?;
            replace_directed(graph, z, y)?;
        }
        ConflictRule::Bidirected => {
            graph.set_endpoint(x.id, y.id, Endpoint::Arrow)?;
            graph.set_endpoint(z.id, y.id, Endpoint::Arrow)?;
        }
        ConflictRule::Overwrite => {
            replace_directed(graph, x, y)?;
            replace_directed(graph, z, y)?;
        }
    }
    debug!("oriented collider {} -> {} <- {}", x, y, z);
    Ok(())
}

fn replace_directed(graph: &mut EdgeListGraph, from: &Node, to: &Node) -> GraphResult<()> {
    graph.remove_connecting_edge(from.id, to.id)?;
    graph.add_directed_edge(from, to)?;
    Ok(())
}

/// Force orientations implied by background knowledge onto the skeleton:
/// a forbidden edge from a to b orients any a - b edge as b -> a, and a
/// required edge orients it a -> b.
pub fn orient_from_knowledge(
    graph: &mut EdgeListGraph,
    knowledge: &dyn Knowledge,
) -> GraphResult<()> {
    for (from, to) in knowledge.forbidden_edges() {
        let pair = match (graph.node_by_name(&from), graph.node_by_name(&to)) {
            (Some(a), Some(b)) => Some((a.clone(), b.clone())),
            _ => None,
        };
        if let Some((a, b)) = pair {
            if graph.is_adjacent_to(a.id, b.id) {
                replace_directed(graph, &b, &a)?;
                debug!("knowledge: oriented {} -> {}", b, a);
            }
        }
    }
    for (from, to) in knowledge.required_edges() {
        let pair = match (graph.node_by_name(&from), graph.node_by_name(&to)) {
            (Some(a), Some(b)) => Some((a.clone(), b.clone())),
            _ => None,
        };
        if let Some((a, b)) = pair {
            if graph.is_adjacent_to(a.id, b.id) {
                replace_directed(graph, &a, &b)?;
                debug!("knowledge: oriented {} -> {}", a, b);
            }
        }
    }
    Ok(())
}

/// Orient every unshielded triple whose recorded separating set excludes
/// the center node. Returns the triples oriented.
pub fn orient_colliders_from_sepsets(
    graph: &mut EdgeListGraph,
    sepsets: &SepsetMap,
    knowledge: &dyn Knowledge,
    rule: ConflictRule,
) -> GraphResult<Vec<Triple>> {
    let mut colliders = Vec::new();
    let nodes: Vec<Node> = graph.nodes().to_vec();
    for b in &nodes {
        let adj = graph.adjacent_nodes(b.id);
        for combo in Combinations::new(adj.len(), 2) {
            let a = &adj[combo[0]];
            let c = &adj[combo[1]];
            if graph.is_adjacent_to(a.id, c.id) {
                continue;
            }
            let Some(sepset) = sepsets.get(a.id, c.id) else {
                continue;
            };
            if sepset.iter().any(|n| n.id == b.id) {
                continue;
            }
            if is_arrowpoint_allowed(a, b, knowledge)
                && is_arrowpoint_allowed(c, b, knowledge)
            {
                orient_collider(graph, a, b, c, rule)?;
                colliders.push(Triple::new(a.clone(), b.clone(), c.clone()));
            }
        }
    }
    Ok(colliders)
}

/// Classification of unshielded triples by the conservative rule.
#[derive(Debug, Clone, Default)]
pub struct ConservativeOutcome {
    pub colliders: Vec<Triple>,
    pub noncolliders: Vec<Triple>,
    pub ambiguous: Vec<Triple>,
}

/// Conservative collider orientation: re-test every subset of each outer
/// node's neighborhood. A triple is a collider only if every separating
/// set found excludes the center, a noncollider only if every one
/// includes it, and ambiguous otherwise (including when no separating
/// set is found at all). Ambiguous triples are marked on the graph.
pub fn orient_colliders_conservative<T: IndependenceTest + ?Sized>(
    graph: &mut EdgeListGraph,
    test: &T,
    knowledge: &dyn Knowledge,
    rule: ConflictRule,
) -> SearchResult<ConservativeOutcome> {
    let mut outcome = ConservativeOutcome::default();
    let nodes: Vec<Node> = graph.nodes().to_vec();
    for b in &nodes {
        let adj = graph.adjacent_nodes(b.id);
        for combo in Combinations::new(adj.len(), 2) {
            let a = &adj[combo[0]];
            let c = &adj[combo[1]];
            if graph.is_adjacent_to(a.id, c.id) {
                continue;
            }

            let sepsets = candidate_sepsets(graph, test, a, c)?;
            let triple = Triple::new(a.clone(), b.clone(), c.clone());
            if sepsets.is_empty() {
                graph.add_ambiguous_triple(a, b, c);
                outcome.ambiguous.push(triple);
            } else if sepsets.iter().all(|s| !s.iter().any(|n| n.id == b.id)) {
                if is_arrowpoint_allowed(a, b, knowledge)
                    && is_arrowpoint_allowed(c, b, knowledge)
                {
                    orient_collider(graph, a, b, c, rule)?;
                }
                outcome.colliders.push(triple);
            } else if sepsets.iter().all(|s| s.iter().any(|n| n.id == b.id)) {
                outcome.noncolliders.push(triple);
            } else {
                graph.add_ambiguous_triple(a, b, c);
                outcome.ambiguous.push(triple);
            }
        }
    }
    debug!(
        colliders = outcome.colliders.len(),
        noncolliders = outcome.noncolliders.len(),
        ambiguous = outcome.ambiguous.len(),
        "conservative collider classification"
    );
    Ok(outcome)
}

/// All subsets of adj(a) and of adj(c) that separate a from c.
fn candidate_sepsets<T: IndependenceTest + ?Sized>(
    graph: &EdgeListGraph,
    test: &T,
    a: &Node,
    c: &Node,
) -> SearchResult<Vec<Vec<Node>>> {
    let mut found = Vec::new();
    for outer in [a, c] {
        let other = if outer.id == a.id { c } else { a };
        let mut neighborhood = graph.adjacent_nodes(outer.id);
        neighborhood.retain(|n| n.id != other.id);
        for size in 0..=neighborhood.len() {
            for combo in Combinations::new(neighborhood.len(), size) {
                let z = select(&neighborhood, &combo);
                if test.check(a, c, &z)?.independent {
                    found.push(z);
                }
            }
        }
    }
    Ok(found)
}
