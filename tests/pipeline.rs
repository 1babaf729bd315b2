//! Tests for the serialized pipeline layout and structural validation.
mod common;
use common::{chain_graph, placed_step};
use gantry::pipeline::StepDefinition;
use gantry::prelude::*;
use uuid::Uuid;

#[test]
fn test_definition_round_trip_preserves_graph() {
    let (graph, [a, b, c]) = chain_graph();
    let metadata = PipelineMetadata::new("round trip");

    let definition = PipelineDefinition::from_graph(&metadata, &graph);
    assert_eq!(definition.step_count(), 3);
    assert_eq!(definition.edge_count(), 2);

    let (restored_meta, restored) = definition.into_graph().unwrap();
    assert_eq!(restored_meta.uuid, metadata.uuid);
    assert_eq!(restored_meta.name, "round trip");
    assert_eq!(restored.len(), 3);
    assert!(restored.has_edge(a, b));
    assert!(restored.has_edge(b, c));
    assert_eq!(
        restored.get(a).unwrap().position,
        graph.get(a).unwrap().position
    );
    // Deserialized steps are visible immediately.
    assert!(!restored.get(a).unwrap().hidden);
}

#[test]
fn test_definition_serialization_is_stable() {
    let (graph, _) = chain_graph();
    let metadata = PipelineMetadata::new("stable");
    let definition = PipelineDefinition::from_graph(&metadata, &graph);

    let first = serde_json::to_string(&definition).unwrap();
    let second = serde_json::to_string(&PipelineDefinition::from_graph(&metadata, &graph)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_into_graph_rejects_malformed_key() {
    let (graph, _) = chain_graph();
    let metadata = PipelineMetadata::new("bad keys");
    let mut definition = PipelineDefinition::from_graph(&metadata, &graph);

    let step = definition.steps.values().next().unwrap().clone();
    definition.steps.insert("not-a-uuid".to_string(), step);

    match definition.into_graph() {
        Err(DefinitionError::MalformedStepId(key)) => assert_eq!(key, "not-a-uuid"),
        other => panic!("expected MalformedStepId, got {other:?}"),
    }
}

#[test]
fn test_validator_passes_well_formed_pipeline() {
    let (graph, _) = chain_graph();
    let metadata = PipelineMetadata::new("valid");
    let definition = PipelineDefinition::from_graph(&metadata, &graph);

    let report = StructuralValidator.validate(&definition);
    assert!(report.valid());
    assert!(report.first_error().is_none());
}

#[test]
fn test_validator_flags_dangling_incoming_connection() {
    let (mut graph, _) = chain_graph();
    let ghost = Uuid::new_v4();
    let orphan = placed_step("Orphan", "orphan.ipynb", 0.0, 400.0);
    let orphan_id = orphan.uuid;
    graph.insert(orphan);
    // Bypass `connect` to fabricate a reference to a step that is not there.
    graph
        .get_mut(orphan_id)
        .unwrap()
        .incoming_connections
        .push(ghost);

    let definition = PipelineDefinition::from_graph(&PipelineMetadata::new("dangling"), &graph);
    let report = StructuralValidator.validate(&definition);
    assert!(!report.valid());
    assert!(report.first_error().unwrap().contains(&ghost.to_string()));
}

#[test]
fn test_validator_flags_self_connection() {
    let (mut graph, [a, _, _]) = chain_graph();
    graph.get_mut(a).unwrap().incoming_connections.push(a);

    let definition = PipelineDefinition::from_graph(&PipelineMetadata::new("self"), &graph);
    let report = StructuralValidator.validate(&definition);
    assert!(!report.valid());
    assert!(report.errors[0].contains("connected to itself"));
}

#[test]
fn test_validator_flags_duplicate_notebook_paths() {
    let mut graph = PipelineGraph::from_steps([
        placed_step("First", "shared.ipynb", 0.0, 0.0),
        placed_step("Second", "shared.ipynb", 400.0, 0.0),
        // Script files may be shared freely.
        placed_step("Third", "shared.py", 800.0, 0.0),
        placed_step("Fourth", "shared.py", 1200.0, 0.0),
    ]);
    graph.rebuild_outgoing();

    let definition = PipelineDefinition::from_graph(&PipelineMetadata::new("dup"), &graph);
    let report = StructuralValidator.validate(&definition);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("shared.ipynb"));
}

#[test]
fn test_validator_flags_cycle_in_definition() {
    // Fabricate a cyclic definition directly; the live graph API would have
    // rejected it.
    let (mut graph, [a, _, c]) = chain_graph();
    graph.get_mut(a).unwrap().incoming_connections.push(c);

    let definition = PipelineDefinition::from_graph(&PipelineMetadata::new("cyclic"), &graph);
    let report = StructuralValidator.validate(&definition);
    assert!(!report.valid());
    assert!(report.errors[0].contains("cycle"));
}

#[test]
fn test_validator_flags_malformed_key_before_anything_else() {
    let mut definition =
        PipelineDefinition::from_graph(&PipelineMetadata::new("keys"), &chain_graph().0);
    definition.steps.insert(
        "step-1".to_string(),
        StepDefinition {
            title: "Broken".to_string(),
            file_path: "broken.ipynb".to_string(),
            environment: String::new(),
            kernel: Default::default(),
            parameters: Default::default(),
            position: (0.0, 0.0),
            incoming_connections: vec![Uuid::new_v4()],
        },
    );

    let report = StructuralValidator.validate(&definition);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("step-1"));
}

#[test]
fn test_into_pipeline_for_flat_format() {
    struct Flat {
        nodes: Vec<(Uuid, &'static str)>,
        edges: Vec<(Uuid, Uuid)>,
    }

    impl IntoPipeline for Flat {
        fn into_pipeline(
            self,
        ) -> std::result::Result<PipelineDefinition, DefinitionError> {
            let metadata = PipelineMetadata::new("flat");
            let mut steps = std::collections::BTreeMap::new();
            for (uuid, title) in self.nodes {
                steps.insert(
                    uuid.to_string(),
                    StepDefinition {
                        title: title.to_string(),
                        file_path: format!("{title}.ipynb"),
                        environment: String::new(),
                        kernel: Default::default(),
                        parameters: Default::default(),
                        position: (0.0, 0.0),
                        incoming_connections: Vec::new(),
                    },
                );
            }
            for (source, target) in self.edges {
                steps
                    .get_mut(&target.to_string())
                    .ok_or_else(|| DefinitionError::Invalid(format!("unknown target {target}")))?
                    .incoming_connections
                    .push(source);
            }
            Ok(PipelineDefinition {
                uuid: metadata.uuid,
                name: metadata.name,
                settings: metadata.settings,
                steps,
            })
        }
    }

    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let flat = Flat {
        nodes: vec![(a, "extract"), (b, "transform")],
        edges: vec![(a, b)],
    };

    let definition = flat.into_pipeline().unwrap();
    assert_eq!(definition.step_count(), 2);
    assert_eq!(definition.edge_count(), 1);
    assert!(StructuralValidator.validate(&definition).valid());
}
