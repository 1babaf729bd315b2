//! Structural validation of serialized pipelines.
//!
//! Consulted before every save and before every run submission; a failing
//! report blocks the operation and its first error is surfaced to the user.

use super::definition::PipelineDefinition;
use crate::graph::cycle;
use ahash::AHashMap;
use itertools::Itertools;
use uuid::Uuid;

/// Outcome of structural validation: pass/fail plus ordered, human-readable
/// error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn passed() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Only the first error is shown to the user.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Validates serialized pipelines.
pub trait PipelineValidator {
    fn validate(&self, pipeline: &PipelineDefinition) -> ValidationReport;
}

/// The default validator: referential integrity, notebook-path uniqueness,
/// and acyclicity.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl PipelineValidator for StructuralValidator {
    fn validate(&self, pipeline: &PipelineDefinition) -> ValidationReport {
        let mut errors = Vec::new();

        let mut ids: Vec<Uuid> = Vec::with_capacity(pipeline.steps.len());
        for key in pipeline.steps.keys() {
            match Uuid::parse_str(key) {
                Ok(uuid) => ids.push(uuid),
                Err(_) => errors.push(format!("Step key '{key}' is not a valid UUID.")),
            }
        }
        if !errors.is_empty() {
            // Without well-formed ids the remaining checks cannot run.
            return ValidationReport { errors };
        }

        for ((_, step), uuid) in pipeline.steps.iter().zip(ids.iter().copied()) {
            for incoming in &step.incoming_connections {
                if *incoming == uuid {
                    errors.push(format!(
                        "Step '{}' is connected to itself, which is not supported.",
                        step.title
                    ));
                } else if !pipeline.steps.contains_key(&incoming.to_string()) {
                    errors.push(format!(
                        "Step '{}' has an incoming connection from '{incoming}', which does not exist in the pipeline.",
                        step.title
                    ));
                }
            }
        }

        // Notebooks can't be attached to more than one step: the kernel
        // writes outputs back into the file.
        let duplicate_paths: Vec<&str> = pipeline
            .steps
            .values()
            .map(|step| step.file_path.as_str())
            .filter(|path| path.ends_with(".ipynb"))
            .sorted()
            .duplicates()
            .collect();
        for path in duplicate_paths {
            errors.push(format!(
                "Notebook '{path}' is used by more than one step. Assign each notebook to a single step."
            ));
        }

        if errors.is_empty() && definition_has_cycle(pipeline) {
            errors.push("The pipeline contains a cycle, which is not supported.".to_string());
        }

        ValidationReport { errors }
    }
}

fn definition_has_cycle(pipeline: &PipelineDefinition) -> bool {
    let mut outgoing: AHashMap<Uuid, Vec<Uuid>> = AHashMap::new();
    for (key, step) in &pipeline.steps {
        let Ok(uuid) = Uuid::parse_str(key) else {
            continue;
        };
        outgoing.entry(uuid).or_default();
        for &parent in &step.incoming_connections {
            outgoing.entry(parent).or_default().push(uuid);
        }
    }
    cycle::has_cycle(&outgoing)
}
