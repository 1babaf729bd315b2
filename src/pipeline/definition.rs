use crate::error::DefinitionError;
use crate::graph::{Kernel, PipelineGraph, Step};
use crate::geometry::Point;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Pipeline-level identity and settings carried alongside the step graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub settings: PipelineSettings,
}

impl PipelineMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            settings: PipelineSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub auto_eviction: bool,
    #[serde(default = "default_memory_size")]
    pub data_passing_memory_size: String,
}

fn default_memory_size() -> String {
    "1GB".to_string()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            auto_eviction: false,
            data_passing_memory_size: default_memory_size(),
        }
    }
}

/// The serialized form of a pipeline: steps keyed by UUID string, with edges
/// implicit in each step's incoming-connections list.
///
/// This is the canonical wire/persistence layout. Steps live in a `BTreeMap`
/// so repeated serializations of the same graph are byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub settings: PipelineSettings,
    #[serde(default)]
    pub steps: BTreeMap<String, StepDefinition>,
}

/// One step as persisted. Position serializes as a `[x, y]` pair; the derived
/// outgoing list is never part of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub title: String,
    pub file_path: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub kernel: Kernel,
    #[serde(default)]
    pub parameters: AHashMap<String, serde_json::Value>,
    #[serde(default)]
    pub position: (f64, f64),
    #[serde(default)]
    pub incoming_connections: Vec<Uuid>,
}

impl PipelineDefinition {
    /// Serializes a live graph into the wire layout. Hidden (not yet placed)
    /// steps are included; their placeholder positions are persisted as-is.
    pub fn from_graph(metadata: &PipelineMetadata, graph: &PipelineGraph) -> Self {
        let steps = graph
            .steps()
            .map(|step| {
                (
                    step.uuid.to_string(),
                    StepDefinition {
                        title: step.title.clone(),
                        file_path: step.file_path.clone(),
                        environment: step.environment.clone(),
                        kernel: step.kernel.clone(),
                        parameters: step.parameters.clone(),
                        position: (step.position.x, step.position.y),
                        incoming_connections: step.incoming_connections.clone(),
                    },
                )
            })
            .collect();

        Self {
            uuid: metadata.uuid,
            name: metadata.name.clone(),
            settings: metadata.settings.clone(),
            steps,
        }
    }

    /// Rehydrates a live graph (and the pipeline metadata) from the wire
    /// layout. Fails on malformed step keys; referential problems beyond that
    /// are the validator's concern.
    pub fn into_graph(self) -> Result<(PipelineMetadata, PipelineGraph), DefinitionError> {
        let metadata = PipelineMetadata {
            uuid: self.uuid,
            name: self.name,
            settings: self.settings,
        };

        let mut graph = PipelineGraph::new();
        for (key, def) in self.steps {
            let uuid = Uuid::parse_str(&key).map_err(|_| DefinitionError::MalformedStepId(key))?;
            graph.insert(Step {
                uuid,
                title: def.title,
                file_path: def.file_path,
                environment: def.environment,
                kernel: def.kernel,
                parameters: def.parameters,
                position: Point::new(def.position.0, def.position.1),
                hidden: false,
                incoming_connections: def.incoming_connections,
                outgoing_connections: Vec::new(),
            });
        }
        Ok((metadata, graph))
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn edge_count(&self) -> usize {
        self.steps
            .values()
            .map(|step| step.incoming_connections.len())
            .sum()
    }
}
