//! The interaction engine: selection, gestures, and click timing.
//!
//! All pointer handling is expressed as pure state transitions on
//! [`CanvasState`]. The engine never touches presentation primitives; it
//! emits [`CanvasEffect`]s for the edit session to act on and exposes its
//! current state for a rendering layer to draw.

use crate::geometry::{Point, Rect};
use crate::graph::PipelineGraph;
use crate::canvas::viewport::Viewport;
use uuid::Uuid;

/// Pointer displacement (in canvas pixels) below which a down/up pair is a
/// click rather than a drag.
pub const DRAG_CLICK_SENSITIVITY: f64 = 3.0;
/// A second qualifying mouseup within this window of the first fires a
/// double-click instead of the pending single-click.
pub const DOUBLE_CLICK_TIMEOUT_MS: u64 = 300;

/// Modifier keys relevant to canvas gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl (or Cmd) toggles steps in and out of the selection.
    pub ctrl: bool,
    /// Holding space turns a canvas drag into a pan.
    pub space: bool,
}

/// A pointer sample in client coordinates, stamped with the event time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Point,
    pub at_ms: u64,
}

impl Pointer {
    pub fn new(x: f64, y: f64, at_ms: u64) -> Self {
        Self {
            position: Point::new(x, y),
            at_ms,
        }
    }
}

/// What the pointer went down (or up) on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Canvas,
    Step(Uuid),
    /// The outgoing-connection handle of a step; starts a connection drag.
    OutgoingHandle(Uuid),
    /// The incoming-connection zone of a step; a valid connection drop site.
    IncomingHandle(Uuid),
}

/// The single active gesture. The variants are mutually exclusive by
/// construction: starting a new gesture while one is active is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    DraggingSteps {
        primary: Uuid,
        /// Accumulated scale-corrected displacement since mousedown.
        displacement: f64,
        dragged: bool,
    },
    DraggingConnection {
        source: Uuid,
        /// Free endpoint in canvas coordinates, not yet bound to a step.
        end: Point,
    },
    RectangleSelecting {
        anchor: Point,
        cursor: Point,
    },
    Panning,
}

/// Which detail surface is open. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenedView {
    #[default]
    None,
    Step(Uuid),
    MultiStep,
}

/// Side effects the engine asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEffect {
    /// A single click, delivered only after the double-click window closed.
    StepClicked(Uuid),
    StepDoubleClicked(Uuid),
    /// Apply the same canvas-space delta to every listed step position.
    StepsMoved { uuids: Vec<Uuid>, dx: f64, dy: f64 },
    /// A step drag crossed the click threshold and has now been released.
    DragFinished,
    /// A floating connection was released; `target` is set when it ended on
    /// an incoming-connection zone.
    ConnectionDropped { source: Uuid, target: Option<Uuid> },
    SelectionChanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingClick {
    step: Uuid,
    fire_at_ms: u64,
}

/// Selection, viewport, and gesture state for one open pipeline canvas.
#[derive(Debug, Default)]
pub struct CanvasState {
    pub viewport: Viewport,
    selected_steps: Vec<Uuid>,
    opened: OpenedView,
    interaction: Interaction,
    /// Previous scale-corrected pointer position, for drag deltas.
    last_pointer: Point,
    /// Previous client-space pointer position, for pan deltas.
    last_client: Point,
    pending_click: Option<PendingClick>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn opened(&self) -> OpenedView {
        self.opened
    }

    pub fn selected_steps(&self) -> &[Uuid] {
        &self.selected_steps
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.interaction, Interaction::DraggingConnection { .. })
    }

    /// The normalized selection rectangle while rectangle-selecting.
    pub fn selection_rectangle(&self) -> Option<Rect> {
        match self.interaction {
            Interaction::RectangleSelecting { anchor, cursor } => {
                Some(Rect::from_corners(anchor, cursor))
            }
            _ => None,
        }
    }

    pub fn select_all(&mut self, graph: &PipelineGraph) {
        self.selected_steps = graph.ids().collect();
        self.resolve_opened_view();
    }

    pub fn deselect_all(&mut self) {
        self.selected_steps.clear();
        self.opened = OpenedView::None;
    }

    /// Selects a single step and opens its detail view.
    pub fn open_step(&mut self, uuid: Uuid) {
        self.selected_steps = vec![uuid];
        self.opened = OpenedView::Step(uuid);
    }

    pub fn close_views(&mut self) {
        self.opened = OpenedView::None;
    }

    /// Drops a deleted step from the selection and any view opened on it.
    pub fn forget_step(&mut self, uuid: Uuid) {
        self.selected_steps.retain(|id| *id != uuid);
        if self.opened == OpenedView::Step(uuid) {
            self.opened = OpenedView::None;
        }
    }

    pub fn pointer_down(
        &mut self,
        target: PointerTarget,
        pointer: Pointer,
        modifiers: Modifiers,
        graph: &PipelineGraph,
    ) -> Vec<CanvasEffect> {
        // Mutual exclusion: one gesture at a time.
        if self.interaction != Interaction::Idle {
            return Vec::new();
        }

        let corrected = self.viewport.scale_corrected(pointer.position);
        self.last_pointer = corrected;
        self.last_client = pointer.position;

        if modifiers.space {
            self.interaction = Interaction::Panning;
            return Vec::new();
        }

        match target {
            PointerTarget::OutgoingHandle(source) => {
                // A connection drag excludes any open detail surface.
                self.opened = OpenedView::None;
                self.interaction = Interaction::DraggingConnection {
                    source,
                    end: corrected,
                };
                Vec::new()
            }
            PointerTarget::Step(uuid) | PointerTarget::IncomingHandle(uuid) => {
                self.interaction = Interaction::DraggingSteps {
                    primary: uuid,
                    displacement: 0.0,
                    dragged: false,
                };
                Vec::new()
            }
            PointerTarget::Canvas => {
                self.opened = OpenedView::None;
                self.interaction = Interaction::RectangleSelecting {
                    anchor: corrected,
                    cursor: corrected,
                };
                self.refresh_rectangle_selection(graph);
                vec![CanvasEffect::SelectionChanged]
            }
        }
    }

    pub fn pointer_move(&mut self, pointer: Pointer, graph: &PipelineGraph) -> Vec<CanvasEffect> {
        let corrected = self.viewport.scale_corrected(pointer.position);
        let (dx, dy) = corrected.delta_from(self.last_pointer);
        let (client_dx, client_dy) = pointer.position.delta_from(self.last_client);
        self.last_pointer = corrected;
        self.last_client = pointer.position;

        match &mut self.interaction {
            Interaction::Idle => Vec::new(),
            Interaction::Panning => {
                self.viewport.pan_by(client_dx, client_dy);
                Vec::new()
            }
            Interaction::DraggingConnection { end, .. } => {
                *end = corrected;
                Vec::new()
            }
            Interaction::RectangleSelecting { cursor, .. } => {
                *cursor = corrected;
                self.refresh_rectangle_selection(graph);
                vec![CanvasEffect::SelectionChanged]
            }
            Interaction::DraggingSteps {
                primary,
                displacement,
                dragged,
            } => {
                *displacement += dx.hypot(dy);
                if *displacement >= DRAG_CLICK_SENSITIVITY {
                    *dragged = true;
                }
                if !*dragged {
                    return Vec::new();
                }

                // Group drag when the grabbed step is part of a
                // multi-selection; otherwise only the grabbed step moves.
                let uuids = if self.selected_steps.len() > 1
                    && self.selected_steps.contains(primary)
                {
                    self.selected_steps.clone()
                } else {
                    vec![*primary]
                };
                vec![CanvasEffect::StepsMoved { uuids, dx, dy }]
            }
        }
    }

    pub fn pointer_up(
        &mut self,
        target: Option<PointerTarget>,
        pointer: Pointer,
        modifiers: Modifiers,
        graph: &PipelineGraph,
    ) -> Vec<CanvasEffect> {
        let interaction = std::mem::take(&mut self.interaction);

        match interaction {
            Interaction::Idle | Interaction::Panning => Vec::new(),
            Interaction::DraggingConnection { source, .. } => {
                let drop_target = match target {
                    Some(PointerTarget::IncomingHandle(uuid)) if uuid != source => Some(uuid),
                    _ => None,
                };
                vec![CanvasEffect::ConnectionDropped {
                    source,
                    target: drop_target,
                }]
            }
            Interaction::RectangleSelecting { anchor, cursor } => {
                self.selected_steps = steps_in_rect(graph, Rect::from_corners(anchor, cursor));
                self.resolve_opened_view();
                vec![CanvasEffect::SelectionChanged]
            }
            Interaction::DraggingSteps {
                primary, dragged, ..
            } => {
                if dragged {
                    return vec![CanvasEffect::DragFinished];
                }

                if modifiers.ctrl {
                    // Additive select: toggle membership.
                    if let Some(pos) = self.selected_steps.iter().position(|id| *id == primary) {
                        self.selected_steps.remove(pos);
                    } else {
                        self.selected_steps.push(primary);
                    }
                    self.resolve_opened_view();
                    return vec![CanvasEffect::SelectionChanged];
                }

                self.selected_steps = vec![primary];
                self.resolve_click(primary, pointer.at_ms)
            }
        }
    }

    /// Advances click timing: a pending single-click whose double-click
    /// window has closed is delivered now.
    pub fn tick(&mut self, now_ms: u64) -> Vec<CanvasEffect> {
        match self.pending_click {
            Some(pending) if now_ms >= pending.fire_at_ms => {
                self.pending_click = None;
                self.open_step(pending.step);
                vec![CanvasEffect::StepClicked(pending.step)]
            }
            _ => Vec::new(),
        }
    }

    fn resolve_click(&mut self, step: Uuid, now_ms: u64) -> Vec<CanvasEffect> {
        match self.pending_click {
            Some(pending) if pending.step == step && now_ms < pending.fire_at_ms => {
                // Second qualifying mouseup inside the window: the pending
                // single-click is canceled in favor of the double-click.
                self.pending_click = None;
                vec![CanvasEffect::StepDoubleClicked(step)]
            }
            _ => {
                self.pending_click = Some(PendingClick {
                    step,
                    fire_at_ms: now_ms + DOUBLE_CLICK_TIMEOUT_MS,
                });
                vec![CanvasEffect::SelectionChanged]
            }
        }
    }

    fn refresh_rectangle_selection(&mut self, graph: &PipelineGraph) {
        let Some(rect) = self.selection_rectangle() else {
            return;
        };
        self.selected_steps = steps_in_rect(graph, rect);
    }

    fn resolve_opened_view(&mut self) {
        self.opened = match self.selected_steps.len() {
            0 => OpenedView::None,
            1 => OpenedView::Step(self.selected_steps[0]),
            _ => OpenedView::MultiStep,
        };
    }
}

/// Steps whose bounding box intersects `rect` (hidden steps are skipped while
/// they await first placement).
fn steps_in_rect(graph: &PipelineGraph, rect: Rect) -> Vec<Uuid> {
    graph
        .steps()
        .filter(|step| !step.hidden && rect.intersects(&step.bounding_box()))
        .map(|step| step.uuid)
        .collect()
}
