//! Common test utilities: graph builders and recording collaborator fakes.
use gantry::prelude::*;
use gantry::session::collaborators::{BackendError, RunUpdate};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use uuid::Uuid;

/// Creates a step that is already placed on the canvas.
#[allow(dead_code)]
pub fn placed_step(title: &str, file_path: &str, x: f64, y: f64) -> Step {
    Step::new(title, file_path).with_position(Point::new(x, y))
}

/// Creates the standard three-step chain `A -> B -> C` with the steps laid
/// out left to right, far enough apart that their boxes do not overlap.
#[allow(dead_code)]
pub fn chain_graph() -> (PipelineGraph, [Uuid; 3]) {
    let a = placed_step("Load", "load.ipynb", 0.0, 0.0);
    let b = placed_step("Clean", "clean.ipynb", 400.0, 0.0);
    let c = placed_step("Train", "train.ipynb", 800.0, 0.0);
    let ids = [a.uuid, b.uuid, c.uuid];

    let mut graph = PipelineGraph::from_steps([a, b, c]);
    graph.connect(ids[0], ids[1]).unwrap();
    graph.connect(ids[1], ids[2]).unwrap();
    (graph, ids)
}

/// Opens an edit session over the standard chain with the given collaborators
/// already wired in.
#[allow(dead_code)]
pub fn chain_session(builder: impl FnOnce(EditSessionBuilder) -> EditSessionBuilder) -> (EditSession, [Uuid; 3]) {
    let (graph, ids) = chain_graph();
    let session = builder(EditSession::builder(
        PipelineMetadata::new("test pipeline"),
        graph,
    ))
    .build();
    (session, ids)
}

/// Everything the recording notifier observed.
#[derive(Debug, Default)]
pub struct NotifierLog {
    pub alerts: Vec<(String, String)>,
    pub confirms: Vec<(String, String)>,
}

/// A notifier that records every dialog and answers confirms from a script.
/// An exhausted script answers `true`.
pub struct RecordingNotifier {
    log: Rc<RefCell<NotifierLog>>,
    confirm_answers: RefCell<VecDeque<bool>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new() -> (Self, Rc<RefCell<NotifierLog>>) {
        let log = Rc::new(RefCell::new(NotifierLog::default()));
        (
            Self {
                log: Rc::clone(&log),
                confirm_answers: RefCell::new(VecDeque::new()),
            },
            log,
        )
    }

    pub fn with_confirm_answers(answers: impl IntoIterator<Item = bool>) -> (Self, Rc<RefCell<NotifierLog>>) {
        let (notifier, log) = Self::new();
        notifier.confirm_answers.borrow_mut().extend(answers);
        (notifier, log)
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&mut self, title: &str, message: &str) {
        self.log
            .borrow_mut()
            .alerts
            .push((title.to_string(), message.to_string()));
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.log
            .borrow_mut()
            .confirms
            .push((title.to_string(), message.to_string()));
        self.confirm_answers.borrow_mut().pop_front().unwrap_or(true)
    }
}

/// Persistence fake that keeps every saved definition for inspection.
pub struct MemoryPersistence {
    saves: Rc<RefCell<Vec<PipelineDefinition>>>,
    ack: SaveAck,
}

#[allow(dead_code)]
impl MemoryPersistence {
    pub fn new() -> (Self, Rc<RefCell<Vec<PipelineDefinition>>>) {
        Self::with_ack(SaveAck::Completed)
    }

    /// A fake that acknowledges with the given mode, e.g. `SaveAck::InFlight`
    /// to model a deferred store.
    pub fn with_ack(ack: SaveAck) -> (Self, Rc<RefCell<Vec<PipelineDefinition>>>) {
        let saves = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                saves: Rc::clone(&saves),
                ack,
            },
            saves,
        )
    }
}

impl PersistenceBackend for MemoryPersistence {
    fn save_pipeline(
        &mut self,
        pipeline: &PipelineDefinition,
    ) -> std::result::Result<SaveAck, BackendError> {
        self.saves.borrow_mut().push(pipeline.clone());
        Ok(self.ack)
    }
}

/// Everything the scripted execution backend observed.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    pub submissions: Vec<(Vec<Uuid>, RunType)>,
    pub cancels: Vec<Uuid>,
}

/// Execution fake that accepts submissions under a fixed run UUID and answers
/// polls from a queue of scripted updates.
pub struct ScriptedExecution {
    log: Rc<RefCell<ExecutionLog>>,
    run_uuid: Uuid,
    updates: Rc<RefCell<VecDeque<RunUpdate>>>,
    reject_submissions: bool,
}

#[allow(dead_code)]
impl ScriptedExecution {
    pub fn new() -> (
        Self,
        Uuid,
        Rc<RefCell<ExecutionLog>>,
        Rc<RefCell<VecDeque<RunUpdate>>>,
    ) {
        let run_uuid = Uuid::new_v4();
        let log = Rc::new(RefCell::new(ExecutionLog::default()));
        let updates = Rc::new(RefCell::new(VecDeque::new()));
        (
            Self {
                log: Rc::clone(&log),
                run_uuid,
                updates: Rc::clone(&updates),
                reject_submissions: false,
            },
            run_uuid,
            log,
            updates,
        )
    }

    pub fn rejecting() -> (Self, Rc<RefCell<ExecutionLog>>) {
        let (mut backend, _, log, _) = Self::new();
        backend.reject_submissions = true;
        (backend, log)
    }
}

impl ExecutionBackend for ScriptedExecution {
    fn submit_run(
        &mut self,
        step_uuids: &[Uuid],
        run_type: RunType,
        _pipeline: &PipelineDefinition,
    ) -> std::result::Result<Uuid, BackendError> {
        if self.reject_submissions {
            return Err(BackendError("environments are still building".to_string()));
        }
        self.log
            .borrow_mut()
            .submissions
            .push((step_uuids.to_vec(), run_type));
        Ok(self.run_uuid)
    }

    fn poll_run(&mut self, _run_uuid: Uuid) -> std::result::Result<RunUpdate, BackendError> {
        self.updates
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| BackendError("no status update scheduled".to_string()))
    }

    fn cancel_run(&mut self, run_uuid: Uuid) -> std::result::Result<(), BackendError> {
        self.log.borrow_mut().cancels.push(run_uuid);
        Ok(())
    }
}
