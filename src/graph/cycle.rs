//! Acyclicity probing for candidate connections.
//!
//! The probe is a pure function: it builds its own outgoing adjacency from
//! the authoritative incoming lists plus the candidate edge, so the input
//! graph is never touched and no coloring state survives between calls.

use super::model::PipelineGraph;
use ahash::{AHashMap, AHashSet};
use uuid::Uuid;

/// Returns true when adding the edge `source -> target` would make the graph
/// cyclic. A self-loop (`source == target`) is a degenerate 1-cycle and is
/// reported identically.
pub fn would_create_cycle(graph: &PipelineGraph, source: Uuid, target: Uuid) -> bool {
    if source == target {
        return true;
    }

    let mut outgoing = outgoing_adjacency(graph);
    outgoing.entry(source).or_default().push(target);
    has_cycle(&outgoing)
}

/// Whole-graph acyclicity check over the authoritative incoming lists.
pub fn is_acyclic(graph: &PipelineGraph) -> bool {
    !has_cycle(&outgoing_adjacency(graph))
}

fn outgoing_adjacency(graph: &PipelineGraph) -> AHashMap<Uuid, Vec<Uuid>> {
    let mut outgoing: AHashMap<Uuid, Vec<Uuid>> = AHashMap::new();
    for step in graph.steps() {
        outgoing.entry(step.uuid).or_default();
        for &parent in &step.incoming_connections {
            outgoing.entry(parent).or_default().push(step.uuid);
        }
    }
    outgoing
}

/// White/grey/black depth-first search. Nodes start white, turn grey on
/// entry and black on exit; reaching a grey node again signals a cycle.
pub(crate) fn has_cycle(outgoing: &AHashMap<Uuid, Vec<Uuid>>) -> bool {
    let mut white: AHashSet<Uuid> = outgoing.keys().copied().collect();
    let mut grey = AHashSet::new();

    while let Some(&start) = white.iter().next() {
        if visit(start, outgoing, &mut white, &mut grey) {
            return true;
        }
    }
    false
}

fn visit(
    node: Uuid,
    outgoing: &AHashMap<Uuid, Vec<Uuid>>,
    white: &mut AHashSet<Uuid>,
    grey: &mut AHashSet<Uuid>,
) -> bool {
    white.remove(&node);
    grey.insert(node);

    if let Some(children) = outgoing.get(&node) {
        for &child in children {
            if grey.contains(&child) {
                return true;
            }
            if white.contains(&child) && visit(child, outgoing, white, grey) {
                return true;
            }
        }
    }

    grey.remove(&node);
    false
}
