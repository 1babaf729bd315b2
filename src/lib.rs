//! # Gantry - Pipeline Canvas Editing Engine
//!
//! **Gantry** is a headless editing engine for node-based data pipelines. It
//! owns everything a pipeline canvas needs that is not pixels: the step graph
//! with its cycle-free invariant, the selection and drag state machine, the
//! viewport transform, debounced persistence, and interactive run tracking.
//! The rendering layer on top stays a thin translation between native input
//! events and the calls below.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic at the edges. It operates on a canonical
//! serialized layout, [`pipeline::PipelineDefinition`], and an in-memory
//! [`graph::PipelineGraph`]. The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your pipeline file into your own Rust structs,
//!     or directly into a `PipelineDefinition` via serde.
//! 2.  **Convert to Gantry's Model**: Implement the `IntoPipeline` trait for
//!     custom formats to translate them into a `PipelineDefinition`.
//! 3.  **Open a Session**: Use `EditSession::builder` (or
//!     `EditSession::from_definition`) to open the pipeline for editing,
//!     wiring in your persistence, execution, and dialog collaborators.
//! 4.  **Drive It**: Feed pointer events and a monotonic clock into the
//!     session; read back graph, selection, save, and run state to render.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gantry::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let metadata = PipelineMetadata::new("California Pizza");
//!     let mut graph = PipelineGraph::new();
//!
//!     let load = Step::new("Load data", "load.ipynb").with_position(Point::new(40.0, 80.0));
//!     let clean = Step::new("Clean data", "clean.ipynb").with_position(Point::new(300.0, 80.0));
//!     let (load_id, clean_id) = (load.uuid, clean.uuid);
//!     graph.insert(load);
//!     graph.insert(clean);
//!     graph.connect(load_id, clean_id)?;
//!
//!     let mut session = EditSession::builder(metadata, graph).build();
//!
//!     // A click on the first step at t=100ms.
//!     session.pointer_down(
//!         PointerTarget::Step(load_id),
//!         Pointer::new(60.0, 100.0, 100),
//!         Modifiers::default(),
//!     );
//!     session.pointer_up(
//!         Some(PointerTarget::Step(load_id)),
//!         Pointer::new(60.0, 100.0, 120),
//!         Modifiers::default(),
//!     );
//!     session.tick(500); // fires the pending single-click
//!
//!     assert_eq!(session.canvas().selected_steps(), [load_id]);
//!     println!("{}", serde_json::to_string_pretty(&session.serialize_pipeline())?);
//!     Ok(())
//! }
//! ```

pub mod canvas;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod pipeline;
pub mod prelude;
pub mod session;
