use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while mutating the pipeline graph.
// `Display`/`Error` are implemented by hand because thiserror's derive treats
// any field named `source` as the error source, and these variants use
// `source` for the edge's source step id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    StepNotFound(Uuid),

    CycleRejected { source: Uuid, target: Uuid },

    DuplicateEdge { source: Uuid, target: Uuid },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::StepNotFound(id) => {
                write!(f, "Step '{id}' does not exist in the pipeline")
            }
            GraphError::CycleRejected { source, target } => write!(
                f,
                "Connecting step '{source}' to step '{target}' would create a cycle in the pipeline, which is not supported"
            ),
            GraphError::DuplicateEdge { source, target } => {
                write!(f, "Steps '{source}' and '{target}' are already connected")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors surfaced by the edit session while coordinating gestures, saves and runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Pipeline validation failed: {0}")]
    ValidationFailed(String),

    #[error("The pipeline is currently executing, please wait until it completes")]
    RunInFlight,

    #[error("There is no pipeline run in progress")]
    NoActiveRun,

    #[error("No steps are selected")]
    NoSelection,

    #[error("{operation} request failed: {message}")]
    Backend { operation: String, message: String },

    #[error("The request was canceled before completion")]
    Canceled,
}

/// Errors that can occur when converting a foreign export format into a
/// `PipelineDefinition`, or a definition back into a live graph.
#[derive(Error, Debug, Clone)]
pub enum DefinitionError {
    #[error("Invalid pipeline data: {0}")]
    Invalid(String),

    #[error("Step key '{0}' is not a valid UUID")]
    MalformedStepId(String),
}
