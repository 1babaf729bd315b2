use crate::geometry::{Point, Rect};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendered width of a step box, used for bounding-box hit tests and for
/// centering newly created steps.
pub const STEP_WIDTH: f64 = 190.0;
/// Rendered height of a step box.
pub const STEP_HEIGHT: f64 = 105.0;

/// Kernel descriptor attached to a step, mirroring the notebook kernel spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    pub name: String,
    pub display_name: String,
}

impl Default for Kernel {
    fn default() -> Self {
        Self {
            name: "python".to_string(),
            display_name: "Python 3".to_string(),
        }
    }
}

/// A single pipeline step.
///
/// `incoming_connections` is the authoritative edge store: an edge A -> B
/// exists iff A appears in B's incoming list. `outgoing_connections` is a
/// derived view rebuilt on demand by
/// [`PipelineGraph::rebuild_outgoing`](crate::graph::PipelineGraph::rebuild_outgoing)
/// and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub uuid: Uuid,
    pub title: String,
    pub file_path: String,
    /// Reference to the execution environment this step runs in.
    pub environment: String,
    pub kernel: Kernel,
    #[serde(default)]
    pub parameters: AHashMap<String, serde_json::Value>,
    pub position: Point,
    /// New steps stay hidden until the first placement pass positions them.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub incoming_connections: Vec<Uuid>,
    #[serde(skip)]
    pub outgoing_connections: Vec<Uuid>,
}

impl Step {
    /// Creates a fresh step with a random UUID at the placeholder position.
    /// It is hidden until placed; see `EditSession::place_step`.
    pub fn new(title: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            file_path: file_path.into(),
            environment: String::new(),
            kernel: Kernel::default(),
            parameters: AHashMap::new(),
            position: Point::default(),
            hidden: true,
            incoming_connections: Vec::new(),
            outgoing_connections: Vec::new(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self.hidden = false;
        self
    }

    /// Axis-aligned bounding box of the rendered step.
    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, STEP_WIDTH, STEP_HEIGHT)
    }
}
