//! The edit session controller.
//!
//! One [`EditSession`] owns the graph and canvas state of a single open
//! pipeline. It translates canvas effects into graph mutations, owns the
//! debounced save trigger, and gates run submission. Everything external
//! (storage, execution, dialogs) goes through the collaborator traits.

pub mod collaborators;
pub mod run;
pub mod save;

use crate::canvas::{CanvasEffect, CanvasState, Modifiers, Pointer, PointerTarget};
use crate::error::{GraphError, SessionError};
use crate::geometry::Point;
use crate::graph::{PipelineGraph, Step, STEP_HEIGHT, STEP_WIDTH};
use crate::pipeline::{PipelineDefinition, PipelineMetadata, PipelineValidator, StructuralValidator};
use collaborators::{
    AcceptAllNotifier, DiscardPersistence, ExecutionBackend, Notifier, PersistenceBackend,
    RunType, SaveAck, StepRunState, StepRunStatus, UnconfiguredExecution,
};
use itertools::Itertools;
use run::RunTracker;
use save::{SaveScheduler, SaveStatus};
use uuid::Uuid;

const DELETE_CONFIRM_MESSAGE: &str = "A deleted step and its logs cannot be recovered once deleted, are you sure you want to proceed?";

/// Notifications the session emits for its embedding view to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A step was double-clicked; the embedder decides how to open its file.
    NotebookRequested(Uuid),
}

/// Builds an [`EditSession`] with optional collaborator overrides.
pub struct EditSessionBuilder {
    metadata: PipelineMetadata,
    graph: PipelineGraph,
    persistence: Box<dyn PersistenceBackend>,
    execution: Box<dyn ExecutionBackend>,
    validator: Box<dyn PipelineValidator>,
    notifier: Box<dyn Notifier>,
    read_only: bool,
}

impl EditSessionBuilder {
    pub fn new(metadata: PipelineMetadata, graph: PipelineGraph) -> Self {
        Self {
            metadata,
            graph,
            persistence: Box::new(DiscardPersistence),
            execution: Box::new(UnconfiguredExecution),
            validator: Box::new(StructuralValidator),
            notifier: Box::new(AcceptAllNotifier),
            read_only: false,
        }
    }

    pub fn with_persistence(mut self, persistence: impl PersistenceBackend + 'static) -> Self {
        self.persistence = Box::new(persistence);
        self
    }

    pub fn with_execution(mut self, execution: impl ExecutionBackend + 'static) -> Self {
        self.execution = Box::new(execution);
        self
    }

    pub fn with_validator(mut self, validator: impl PipelineValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn build(self) -> EditSession {
        EditSession {
            metadata: self.metadata,
            graph: self.graph,
            canvas: CanvasState::new(),
            saves: SaveScheduler::new(),
            runs: RunTracker::new(),
            persistence: self.persistence,
            execution: self.execution,
            validator: self.validator,
            notifier: self.notifier,
            events: Vec::new(),
            read_only: self.read_only,
            closed: false,
        }
    }
}

/// The controller that owns one open pipeline's graph, canvas state, and
/// save/run coordination.
pub struct EditSession {
    metadata: PipelineMetadata,
    graph: PipelineGraph,
    canvas: CanvasState,
    saves: SaveScheduler,
    runs: RunTracker,
    persistence: Box<dyn PersistenceBackend>,
    execution: Box<dyn ExecutionBackend>,
    validator: Box<dyn PipelineValidator>,
    notifier: Box<dyn Notifier>,
    events: Vec<SessionEvent>,
    read_only: bool,
    closed: bool,
}

impl EditSession {
    pub fn builder(metadata: PipelineMetadata, graph: PipelineGraph) -> EditSessionBuilder {
        EditSessionBuilder::new(metadata, graph)
    }

    /// Rehydrates a session from a serialized pipeline.
    pub fn from_definition(
        definition: PipelineDefinition,
    ) -> Result<EditSessionBuilder, crate::error::DefinitionError> {
        let (metadata, graph) = definition.into_graph()?;
        Ok(EditSessionBuilder::new(metadata, graph))
    }

    // --- State access -----------------------------------------------------

    pub fn metadata(&self) -> &PipelineMetadata {
        &self.metadata
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasState {
        &mut self.canvas
    }

    pub fn select_all(&mut self) {
        self.canvas.select_all(&self.graph);
    }

    pub fn deselect_all(&mut self) {
        self.canvas.deselect_all();
    }

    pub fn save_status(&self) -> SaveStatus {
        self.saves.status()
    }

    pub fn running(&self) -> bool {
        self.runs.running()
    }

    pub fn active_run(&self) -> Option<Uuid> {
        self.runs.active_run()
    }

    pub fn step_run_status(&self, uuid: Uuid) -> StepRunStatus {
        self.runs.step_status(uuid)
    }

    pub fn step_run_state(&self, uuid: Uuid) -> Option<&StepRunState> {
        self.runs.step_state(uuid)
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Drains the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serializes the current graph into the canonical wire layout.
    pub fn serialize_pipeline(&self) -> PipelineDefinition {
        PipelineDefinition::from_graph(&self.metadata, &self.graph)
    }

    // --- Pointer plumbing -------------------------------------------------

    pub fn pointer_down(&mut self, target: PointerTarget, pointer: Pointer, modifiers: Modifiers) {
        let effects = self
            .canvas
            .pointer_down(target, pointer, modifiers, &self.graph);
        self.apply_effects(effects, pointer.at_ms);
    }

    pub fn pointer_move(&mut self, pointer: Pointer) {
        let effects = self.canvas.pointer_move(pointer, &self.graph);
        self.apply_effects(effects, pointer.at_ms);
    }

    pub fn pointer_up(
        &mut self,
        target: Option<PointerTarget>,
        pointer: Pointer,
        modifiers: Modifiers,
    ) {
        let effects = self
            .canvas
            .pointer_up(target, pointer, modifiers, &self.graph);
        self.apply_effects(effects, pointer.at_ms);
    }

    /// Advances time-driven work: pending clicks, the save debounce, and
    /// status polling. Call this from the host's frame/timer loop.
    pub fn tick(&mut self, now_ms: u64) {
        if self.closed {
            return;
        }

        let effects = self.canvas.tick(now_ms);
        self.apply_effects(effects, now_ms);

        if self.saves.take_due(now_ms) {
            self.perform_save();
        }

        if let Some(run_uuid) = self.runs.poll_due(now_ms) {
            // Poll failures are swallowed; the next interval retries.
            if let Ok(update) = self.execution.poll_run(run_uuid) {
                self.runs.merge(&update);
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<CanvasEffect>, now_ms: u64) {
        for effect in effects {
            match effect {
                CanvasEffect::StepClicked(_) | CanvasEffect::SelectionChanged => {}
                CanvasEffect::StepDoubleClicked(uuid) => {
                    self.events.push(SessionEvent::NotebookRequested(uuid));
                }
                CanvasEffect::StepsMoved { uuids, dx, dy } => {
                    for uuid in uuids {
                        if let Some(step) = self.graph.get_mut(uuid) {
                            step.position = step.position.offset(dx, dy);
                        }
                    }
                }
                CanvasEffect::DragFinished => {
                    self.saves.mark_dirty(now_ms);
                }
                CanvasEffect::ConnectionDropped { source, target } => {
                    if let Some(target) = target {
                        // Rejection discards the floating connection; the
                        // graph is left exactly as it was.
                        let _ = self.try_connect(source, target, now_ms);
                    }
                }
            }
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Canceled);
        }
        Ok(())
    }

    // --- Graph edits ------------------------------------------------------

    /// Creates a new step at the placeholder position. It stays hidden until
    /// [`EditSession::place_step`] runs, and is selected with its detail view
    /// open, matching the new-step flow of the editor.
    pub fn create_step(&mut self, title: impl Into<String>, file_path: impl Into<String>) -> Uuid {
        let step = Step::new(title, file_path);
        let uuid = step.uuid;
        self.graph.insert(step);
        self.canvas.open_step(uuid);
        uuid
    }

    /// Positions a freshly created step at the canvas center, reveals it, and
    /// schedules a save.
    pub fn place_step(
        &mut self,
        uuid: Uuid,
        canvas_center: Point,
        now_ms: u64,
    ) -> Result<(), SessionError> {
        self.ensure_open()?;
        let offset = self.canvas.viewport.offset;
        let step = self
            .graph
            .get_mut(uuid)
            .ok_or(GraphError::StepNotFound(uuid))?;
        step.position = Point::new(
            canvas_center.x - offset.x - STEP_WIDTH / 2.0,
            canvas_center.y - offset.y - STEP_HEIGHT / 2.0,
        );
        step.hidden = false;
        self.saves.mark_dirty(now_ms);
        Ok(())
    }

    /// Commits the edge `source -> target`, alerting the user when the edge
    /// is a duplicate or would create a cycle.
    pub fn connect_steps(
        &mut self,
        source: Uuid,
        target: Uuid,
        now_ms: u64,
    ) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.try_connect(source, target, now_ms)
            .map_err(SessionError::from)
    }

    fn try_connect(&mut self, source: Uuid, target: Uuid, now_ms: u64) -> Result<(), GraphError> {
        match self.graph.connect(source, target) {
            Ok(()) => {
                self.saves.mark_dirty(now_ms);
                Ok(())
            }
            Err(err) => {
                match &err {
                    GraphError::CycleRejected { .. } => self.notifier.alert(
                        "Error",
                        "Connecting this step will create a cycle in your pipeline which is not supported.",
                    ),
                    GraphError::DuplicateEdge { .. } => self.notifier.alert(
                        "Error",
                        "These steps are already connected. No new connection has been created.",
                    ),
                    GraphError::StepNotFound(_) => {}
                }
                Err(err)
            }
        }
    }

    /// Removes the edge `source -> target` if present.
    pub fn remove_connection(&mut self, source: Uuid, target: Uuid, now_ms: u64) -> bool {
        let removed = self.graph.disconnect(source, target);
        if removed {
            self.saves.mark_dirty(now_ms);
        }
        removed
    }

    /// Deletes every selected step after one confirmation. Irreversible: the
    /// cascade removes all edges touching each step.
    pub fn delete_selected_steps(&mut self, now_ms: u64) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.canvas.selected_steps().is_empty() {
            return Err(SessionError::NoSelection);
        }
        if !self.notifier.confirm("Warning", DELETE_CONFIRM_MESSAGE) {
            return Ok(());
        }

        self.canvas.close_views();
        // The snapshot keeps iteration stable while deletion shrinks the
        // selection underneath us.
        let doomed: Vec<Uuid> = self.canvas.selected_steps().to_vec();
        for uuid in doomed {
            self.delete_step_unchecked(uuid);
        }
        self.canvas.deselect_all();
        self.saves.mark_dirty(now_ms);
        Ok(())
    }

    /// Deletes a single step after confirmation (the detail-view delete).
    pub fn delete_step(&mut self, uuid: Uuid, now_ms: u64) -> Result<(), SessionError> {
        self.ensure_open()?;
        if !self.graph.contains(uuid) {
            return Err(GraphError::StepNotFound(uuid).into());
        }
        if !self.notifier.confirm("Warning", DELETE_CONFIRM_MESSAGE) {
            return Ok(());
        }
        self.delete_step_unchecked(uuid);
        self.saves.mark_dirty(now_ms);
        Ok(())
    }

    fn delete_step_unchecked(&mut self, uuid: Uuid) {
        self.graph.remove_step(uuid);
        self.canvas.forget_step(uuid);
    }

    // --- Saving -----------------------------------------------------------

    /// Called by the embedder when a deferred save settles. Settlements that
    /// arrive after `close` are discarded.
    pub fn note_save_settled(&mut self) {
        if self.closed {
            return;
        }
        self.saves.note_settled();
    }

    fn perform_save(&mut self) {
        if self.read_only {
            return;
        }
        let pipeline = self.serialize_pipeline();
        let report = self.validator.validate(&pipeline);
        if !report.valid() {
            if let Some(first) = report.first_error() {
                self.notifier.alert("Error", first);
            }
            return;
        }
        self.issue_save(&pipeline);
    }

    fn issue_save(&mut self, pipeline: &PipelineDefinition) {
        self.saves.note_issued();
        match self.persistence.save_pipeline(pipeline) {
            Ok(SaveAck::Completed) => self.saves.note_settled(),
            Ok(SaveAck::InFlight) => {}
            Err(err) => {
                self.saves.note_settled();
                self.notifier
                    .alert("Error", &format!("Failed to save pipeline. {err}"));
            }
        }
    }

    // --- Runs -------------------------------------------------------------

    /// Runs exactly the selected steps.
    pub fn run_selected(&mut self, now_ms: u64) -> Result<Uuid, SessionError> {
        let uuids = self.canvas.selected_steps().to_vec();
        self.submit_run(uuids, RunType::Selection, now_ms)
    }

    /// Runs the selected steps plus their transitive incoming closure.
    pub fn run_incoming(&mut self, now_ms: u64) -> Result<Uuid, SessionError> {
        let selected = self.canvas.selected_steps().to_vec();
        let mut uuids = selected.clone();
        uuids.extend(self.graph.incoming_closure(&selected).into_iter().sorted());
        self.submit_run(uuids, RunType::Incoming, now_ms)
    }

    /// Runs the whole pipeline.
    pub fn run_pipeline(&mut self, now_ms: u64) -> Result<Uuid, SessionError> {
        let uuids: Vec<Uuid> = self.graph.ids().sorted().collect();
        self.submit_run(uuids, RunType::Pipeline, now_ms)
    }

    fn submit_run(
        &mut self,
        uuids: Vec<Uuid>,
        run_type: RunType,
        now_ms: u64,
    ) -> Result<Uuid, SessionError> {
        self.ensure_open()?;
        if self.runs.running() {
            self.notifier.alert(
                "Error",
                "The pipeline is currently executing, please wait until it completes.",
            );
            return Err(SessionError::RunInFlight);
        }
        if uuids.is_empty() && run_type != RunType::Pipeline {
            return Err(SessionError::NoSelection);
        }

        let pipeline = self.serialize_pipeline();
        let report = self.validator.validate(&pipeline);
        if !report.valid() {
            let first = report.first_error().unwrap_or("invalid pipeline").to_string();
            self.notifier.alert("Error", &first);
            return Err(SessionError::ValidationFailed(first));
        }

        // Any edits still waiting on the debounce are flushed before the run
        // so the backend executes what the user sees.
        if self.saves.take_pending() {
            self.issue_save(&pipeline);
        }

        match self.execution.submit_run(&uuids, run_type, &pipeline) {
            Ok(run_uuid) => {
                self.runs.begin(run_uuid, now_ms);
                Ok(run_uuid)
            }
            Err(err) => {
                self.notifier
                    .alert("Error", &format!("Failed to start interactive run. {err}"));
                Err(SessionError::Backend {
                    operation: "run submission".to_string(),
                    message: err.0,
                })
            }
        }
    }

    /// Requests cancellation of the active run. Polling continues until the
    /// backend reports the terminal aborted status.
    pub fn cancel_run(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let Some(run_uuid) = self.runs.active_run() else {
            self.notifier.alert("Error", "There is no pipeline running.");
            return Err(SessionError::NoActiveRun);
        };
        self.execution.cancel_run(run_uuid).map_err(|err| {
            self.notifier.alert(
                "Error",
                &format!("Could not cancel pipeline run for runUUID {run_uuid}"),
            );
            SessionError::Backend {
                operation: "run cancellation".to_string(),
                message: err.0,
            }
        })
    }

    // --- Lifecycle --------------------------------------------------------

    /// Tears the session down (view unmount): pending debounce and poll
    /// deadlines are dropped, and late save settlements are ignored. Nothing
    /// a canceled operation returns can mutate this session afterwards.
    pub fn close(&mut self) {
        self.closed = true;
        self.saves.cancel_pending();
        self.runs.clear();
    }

    pub fn closed(&self) -> bool {
        self.closed
    }
}
