use super::definition::PipelineDefinition;
use crate::error::DefinitionError;

/// A trait for foreign export formats that can be converted into the
/// canonical [`PipelineDefinition`].
///
/// This is the extension point that keeps gantry format-agnostic: parse your
/// own editor/export format into your own structs, then implement
/// `IntoPipeline` to provide the translation layer into the canonical wire
/// layout.
///
/// # Example
///
/// ```rust,no_run
/// use gantry::pipeline::{IntoPipeline, PipelineDefinition};
/// use gantry::error::DefinitionError;
///
/// // 1. Define structs matching your export format.
/// struct FlatNode { id: String, name: String, path: String }
/// struct FlatExport { nodes: Vec<FlatNode>, edges: Vec<(String, String)> }
///
/// // 2. Implement `IntoPipeline` for the top-level struct.
/// impl IntoPipeline for FlatExport {
///     fn into_pipeline(self) -> Result<PipelineDefinition, DefinitionError> {
///         // Map nodes to step definitions keyed by UUID string, and fold
///         // each edge into its target's incoming_connections list.
///         # unimplemented!()
///     }
/// }
/// ```
pub trait IntoPipeline {
    /// Consumes the object and converts it into the canonical pipeline layout.
    fn into_pipeline(self) -> Result<PipelineDefinition, DefinitionError>;
}
