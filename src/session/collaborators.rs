//! Collaborator seams of the edit session.
//!
//! The session is single-threaded and event-driven, so every collaborator is
//! a plain synchronous trait: the embedding application owns whatever async
//! plumbing it needs and feeds completions back as return values (or, for
//! deferred saves, via `EditSession::note_save_settled`).

use crate::pipeline::PipelineDefinition;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a persistence or execution collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

/// How a set of step UUIDs is expanded into an actual run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    /// Run exactly the selected steps.
    Selection,
    /// Run the selected steps plus their transitive incoming closure.
    Incoming,
    /// Run the whole pipeline.
    Pipeline,
}

/// Overall status of a submitted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Started,
    Success,
    Aborted,
    Failure,
}

impl RunStatus {
    /// Terminal statuses end the polling loop.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Aborted | Self::Failure)
    }
}

/// Execution status of a single step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepRunStatus {
    #[default]
    Idle,
    Pending,
    Started,
    Success,
    Aborted,
    Failure,
}

/// Per-step state reported by one status poll. Finished time takes priority
/// over started time when rendering durations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRunState {
    pub step_uuid: Uuid,
    pub status: StepRunStatus,
    #[serde(default)]
    pub started_time: Option<String>,
    #[serde(default)]
    pub finished_time: Option<String>,
}

/// One status poll result for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUpdate {
    pub run_uuid: Uuid,
    pub status: RunStatus,
    #[serde(default)]
    pub steps: Vec<StepRunState>,
    #[serde(default)]
    pub server_time: Option<String>,
}

/// Acknowledgement of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAck {
    /// The save settled synchronously.
    Completed,
    /// The save is in flight; the caller will invoke
    /// `EditSession::note_save_settled` when it settles.
    InFlight,
}

/// Stores serialized pipelines.
pub trait PersistenceBackend {
    fn save_pipeline(&mut self, pipeline: &PipelineDefinition) -> Result<SaveAck, BackendError>;
}

/// Submits runs and answers status polls.
pub trait ExecutionBackend {
    fn submit_run(
        &mut self,
        step_uuids: &[Uuid],
        run_type: RunType,
        pipeline: &PipelineDefinition,
    ) -> Result<Uuid, BackendError>;

    fn poll_run(&mut self, run_uuid: Uuid) -> Result<RunUpdate, BackendError>;

    fn cancel_run(&mut self, run_uuid: Uuid) -> Result<(), BackendError>;
}

/// Surfaces blocking alert/confirm dialogs. The session never proceeds past a
/// cycle rejection or a delete confirmation without the resolution.
pub trait Notifier {
    fn alert(&mut self, title: &str, message: &str);

    /// Returns true when the user confirmed.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Default persistence for sessions without a configured store: acknowledges
/// and discards.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardPersistence;

impl PersistenceBackend for DiscardPersistence {
    fn save_pipeline(&mut self, _pipeline: &PipelineDefinition) -> Result<SaveAck, BackendError> {
        Ok(SaveAck::Completed)
    }
}

/// Default execution backend: rejects every submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredExecution;

impl ExecutionBackend for UnconfiguredExecution {
    fn submit_run(
        &mut self,
        _step_uuids: &[Uuid],
        _run_type: RunType,
        _pipeline: &PipelineDefinition,
    ) -> Result<Uuid, BackendError> {
        Err(BackendError("no execution backend configured".to_string()))
    }

    fn poll_run(&mut self, _run_uuid: Uuid) -> Result<RunUpdate, BackendError> {
        Err(BackendError("no execution backend configured".to_string()))
    }

    fn cancel_run(&mut self, _run_uuid: Uuid) -> Result<(), BackendError> {
        Err(BackendError("no execution backend configured".to_string()))
    }
}

/// Headless notifier: drops alerts and accepts every confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllNotifier;

impl Notifier for AcceptAllNotifier {
    fn alert(&mut self, _title: &str, _message: &str) {}

    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        true
    }
}
