//! Debounced, coalescing save scheduling and the in-flight save counter.

/// Mutations arm (or re-arm) a deadline this far in the future; everything
/// that happens before the deadline passes is coalesced into one save.
pub const SAVE_DEBOUNCE_MS: u64 = 250;

/// User-visible persistence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Saving,
    Dirty,
}

/// Tracks the save token, the debounce deadline, and in-flight saves.
///
/// The token increases monotonically on every mutation; a flush captures the
/// current token, so `Dirty` is exactly "mutations newer than the last
/// flush". In-flight saves are counted up on issue and down on settlement,
/// which tolerates out-of-order completions: `Saved` is only shown once the
/// counter is back at zero.
#[derive(Debug, Default)]
pub struct SaveScheduler {
    token: u64,
    flushed_token: u64,
    deadline: Option<u64>,
    ongoing: u32,
}

impl SaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mutation and re-arms the debounce deadline.
    pub fn mark_dirty(&mut self, now_ms: u64) {
        self.token += 1;
        self.deadline = Some(now_ms + SAVE_DEBOUNCE_MS);
    }

    /// Returns true when a save is due, consuming the deadline and capturing
    /// the token. The caller serializes exactly once per `true`.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                self.flushed_token = self.token;
                true
            }
            _ => false,
        }
    }

    /// Forces any pending deadline to fire immediately (used to flush before
    /// a run submission). Returns whether there was anything to flush.
    pub fn take_pending(&mut self) -> bool {
        if self.deadline.take().is_some() || self.token != self.flushed_token {
            self.flushed_token = self.token;
            true
        } else {
            false
        }
    }

    pub fn note_issued(&mut self) {
        self.ongoing += 1;
    }

    pub fn note_settled(&mut self) {
        self.ongoing = self.ongoing.saturating_sub(1);
    }

    /// Abandons anything not yet flushed (session teardown).
    pub fn cancel_pending(&mut self) {
        self.deadline = None;
        self.flushed_token = self.token;
    }

    pub fn status(&self) -> SaveStatus {
        if self.deadline.is_some() || self.token != self.flushed_token {
            SaveStatus::Dirty
        } else if self.ongoing > 0 {
            SaveStatus::Saving
        } else {
            SaveStatus::Saved
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}
