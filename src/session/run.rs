//! Active-run tracking and status-poll scheduling.

use super::collaborators::{RunUpdate, StepRunState, StepRunStatus};
use ahash::AHashMap;
use uuid::Uuid;

/// Fixed interval between status polls for an active run.
pub const STATUS_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
struct ActiveRun {
    uuid: Uuid,
    next_poll_at: u64,
}

/// Tracks at most one submitted run and the per-step execution states merged
/// from its status polls.
///
/// Polls never overlap: `poll_due` hands out the run id at most once per
/// interval, and the next deadline is armed before the poll result is merged.
/// A terminal status clears the active run, which stops the polling loop.
#[derive(Debug, Default)]
pub struct RunTracker {
    active: Option<ActiveRun>,
    step_states: AHashMap<Uuid, StepRunState>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_run(&self) -> Option<Uuid> {
        self.active.map(|run| run.uuid)
    }

    /// Starts tracking a freshly submitted run; the first poll is due one
    /// interval from now.
    pub fn begin(&mut self, run_uuid: Uuid, now_ms: u64) {
        self.active = Some(ActiveRun {
            uuid: run_uuid,
            next_poll_at: now_ms + STATUS_POLL_INTERVAL_MS,
        });
    }

    /// Returns the run to poll when its deadline has passed, re-arming the
    /// next deadline.
    pub fn poll_due(&mut self, now_ms: u64) -> Option<Uuid> {
        let run = self.active.as_mut()?;
        if now_ms < run.next_poll_at {
            return None;
        }
        run.next_poll_at = now_ms + STATUS_POLL_INTERVAL_MS;
        Some(run.uuid)
    }

    /// Merges one poll result into the per-step execution states. A terminal
    /// overall status ends the run.
    pub fn merge(&mut self, update: &RunUpdate) {
        if self.active_run() != Some(update.run_uuid) {
            // Stale result from a run that is no longer tracked.
            return;
        }
        for step in &update.steps {
            self.step_states.insert(step.step_uuid, step.clone());
        }
        if update.status.is_terminal() {
            self.active = None;
        }
    }

    /// Execution status for a step; steps never reported default to idle.
    pub fn step_status(&self, uuid: Uuid) -> StepRunStatus {
        self.step_states
            .get(&uuid)
            .map(|state| state.status)
            .unwrap_or_default()
    }

    pub fn step_state(&self, uuid: Uuid) -> Option<&StepRunState> {
        self.step_states.get(&uuid)
    }

    /// Stops tracking (view unmount); per-step states are kept for rendering
    /// the last known outcome.
    pub fn clear(&mut self) {
        self.active = None;
    }
}
