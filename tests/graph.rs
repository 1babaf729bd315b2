//! Tests for the graph model and the cycle probe.
mod common;
use common::{chain_graph, placed_step};
use gantry::graph::cycle::{is_acyclic, would_create_cycle};
use gantry::prelude::*;

#[test]
fn test_connect_stores_edge_on_target() {
    let (graph, [a, b, _]) = chain_graph();
    assert!(graph.has_edge(a, b));
    assert_eq!(graph.get(b).unwrap().incoming_connections, vec![a]);
    assert!(graph.get(a).unwrap().incoming_connections.is_empty());
}

#[test]
fn test_connect_rejects_duplicate_edge() {
    let (mut graph, [a, b, _]) = chain_graph();
    let err = graph.connect(a, b).unwrap_err();
    assert_eq!(err, GraphError::DuplicateEdge { source: a, target: b });
    // The edge is still stored exactly once.
    assert_eq!(graph.get(b).unwrap().incoming_connections, vec![a]);
}

#[test]
fn test_connect_rejects_missing_step() {
    let (mut graph, [a, _, _]) = chain_graph();
    let ghost = uuid::Uuid::new_v4();
    assert_eq!(
        graph.connect(a, ghost).unwrap_err(),
        GraphError::StepNotFound(ghost)
    );
    assert_eq!(
        graph.connect(ghost, a).unwrap_err(),
        GraphError::StepNotFound(ghost)
    );
}

#[test]
fn test_connect_rejects_back_edge() {
    // A -> B -> C: closing the loop from C back to A must fail and leave the
    // graph untouched.
    let (mut graph, [a, b, c]) = chain_graph();
    let err = graph.connect(c, a).unwrap_err();
    assert_eq!(err, GraphError::CycleRejected { source: c, target: a });
    assert!(!graph.has_edge(c, a));
    assert_eq!(graph.edge_count(), 2);
    assert!(is_acyclic(&graph));
}

#[test]
fn test_connect_rejects_self_loop() {
    let (mut graph, [a, _, _]) = chain_graph();
    assert_eq!(
        graph.connect(a, a).unwrap_err(),
        GraphError::CycleRejected { source: a, target: a }
    );
}

#[test]
fn test_cycle_probe_matches_ancestry() {
    // An edge u -> v creates a cycle exactly when v is already an ancestor
    // of u (or u itself).
    let (graph, [a, b, c]) = chain_graph();
    assert!(would_create_cycle(&graph, a, a));
    assert!(would_create_cycle(&graph, b, a));
    assert!(would_create_cycle(&graph, c, a));
    assert!(would_create_cycle(&graph, c, b));
    assert!(!would_create_cycle(&graph, a, c));
}

#[test]
fn test_skip_connection_appends_to_incoming() {
    // A -> C alongside A -> B -> C is a skip connection, not a cycle.
    let (mut graph, [a, b, c]) = chain_graph();
    graph.connect(a, c).unwrap();
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.get(c).unwrap().incoming_connections, vec![b, a]);
}

#[test]
fn test_cycle_probe_leaves_graph_untouched() {
    let (graph, [_, _, c]) = chain_graph();
    let d = placed_step("Report", "report.ipynb", 1200.0, 0.0);
    let d_id = d.uuid;
    let mut graph = graph;
    graph.insert(d);

    let edges_before = graph.edge_count();
    assert!(!would_create_cycle(&graph, c, d_id));
    assert!(!would_create_cycle(&graph, d_id, c));
    assert_eq!(graph.edge_count(), edges_before);
}

#[test]
fn test_diamond_is_not_a_cycle() {
    // A -> B, A -> C, B -> D, C -> D is a diamond, not a cycle.
    let steps: Vec<Step> = ["a", "b", "c", "d"]
        .iter()
        .enumerate()
        .map(|(i, name)| placed_step(name, &format!("{name}.ipynb"), i as f64 * 400.0, 0.0))
        .collect();
    let ids: Vec<_> = steps.iter().map(|s| s.uuid).collect();
    let mut graph = PipelineGraph::from_steps(steps);

    graph.connect(ids[0], ids[1]).unwrap();
    graph.connect(ids[0], ids[2]).unwrap();
    graph.connect(ids[1], ids[3]).unwrap();
    graph.connect(ids[2], ids[3]).unwrap();
    assert!(is_acyclic(&graph));
    // But closing D back to A is rejected.
    assert!(would_create_cycle(&graph, ids[3], ids[0]));
}

#[test]
fn test_disconnect_is_idempotent() {
    let (mut graph, [a, b, _]) = chain_graph();
    assert!(graph.disconnect(a, b));
    assert!(!graph.disconnect(a, b));
    assert!(!graph.has_edge(a, b));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_remove_step_cascades_edges() {
    // Removing B from A -> B -> C must scrub both of its edges.
    let (mut graph, [a, b, c]) = chain_graph();
    let removed = graph.remove_step(b).unwrap();
    assert_eq!(removed.uuid, b);
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.get(c).unwrap().incoming_connections.is_empty());
    assert!(graph.get(a).is_some());
}

#[test]
fn test_remove_missing_step_is_none() {
    let (mut graph, _) = chain_graph();
    assert!(graph.remove_step(uuid::Uuid::new_v4()).is_none());
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_rebuild_outgoing_derives_from_incoming() {
    let (mut graph, [a, b, c]) = chain_graph();
    graph.rebuild_outgoing();
    assert_eq!(graph.get(a).unwrap().outgoing_connections, vec![b]);
    assert_eq!(graph.get(b).unwrap().outgoing_connections, vec![c]);
    assert!(graph.get(c).unwrap().outgoing_connections.is_empty());

    // A second rebuild after an edit reflects the new edge set.
    graph.disconnect(a, b);
    graph.rebuild_outgoing();
    assert!(graph.get(a).unwrap().outgoing_connections.is_empty());
}

#[test]
fn test_incoming_closure_collects_all_ancestors() {
    let (graph, [a, b, c]) = chain_graph();
    let closure = graph.incoming_closure(&[c]);
    assert_eq!(closure.len(), 2);
    assert!(closure.contains(&a));
    assert!(closure.contains(&b));

    // Roots themselves are excluded even when they are each other's ancestors.
    let closure = graph.incoming_closure(&[b, c]);
    assert_eq!(closure.len(), 1);
    assert!(closure.contains(&a));

    assert!(graph.incoming_closure(&[a]).is_empty());
}

#[test]
fn test_edges_lists_every_pair() {
    let (graph, [a, b, c]) = chain_graph();
    let mut edges = graph.edges();
    edges.sort();
    let mut expected = vec![(a, b), (b, c)];
    expected.sort();
    assert_eq!(edges, expected);
}
