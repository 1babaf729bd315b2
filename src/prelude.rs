//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! gantry crate. Import this module to get access to the core functionality
//! without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use gantry::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let raw = std::fs::read_to_string("path/to/pipeline.json")?;
//! let definition: PipelineDefinition = serde_json::from_str(&raw)?;
//!
//! let mut session = EditSession::from_definition(definition)?.build();
//! session.select_all();
//! session.run_selected(0)?;
//! # Ok(())
//! # }
//! ```

// The session controller and its collaborator seams
pub use crate::session::collaborators::{
    ExecutionBackend, Notifier, PersistenceBackend, RunStatus, RunType, SaveAck, StepRunStatus,
};
pub use crate::session::save::SaveStatus;
pub use crate::session::{EditSession, EditSessionBuilder, SessionEvent};

// Graph model
pub use crate::graph::{PipelineGraph, Step};

// Canvas state machine
pub use crate::canvas::{CanvasState, Modifiers, Pointer, PointerTarget, Viewport};

// Serialized layout and conversion
pub use crate::pipeline::{
    IntoPipeline, PipelineDefinition, PipelineMetadata, PipelineValidator, StructuralValidator,
};

// Geometry
pub use crate::geometry::{Point, Rect};

// Error types
pub use crate::error::{DefinitionError, GraphError, SessionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
