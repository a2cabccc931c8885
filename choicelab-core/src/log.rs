//! ExperimentLog: append-only history of finished and aborted sessions
//!
//! Entries live for the lifetime of the process. Nothing here touches disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::SessionSnapshot;
use crate::session::ParticipantResult;

/// How a logged session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    /// Closed with `reset` after results were collected
    Completed,
    /// Aborted with `stop`
    Stopped,
}

/// Immutable snapshot of a session taken when it was reset or stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentLogEntry {
    /// Monotonic, starting at 1
    pub session_id: u64,
    pub timestamp: DateTime<Utc>,
    pub participant_count: usize,
    pub group_a_size: usize,
    pub group_b_size: usize,
    pub status: LogStatus,
    pub results: Vec<ParticipantResult>,
}

/// In-memory log of past sessions
#[derive(Debug, Clone)]
pub struct ExperimentLog {
    entries: Vec<ExperimentLogEntry>,
    next_session_id: u64,
}

impl Default for ExperimentLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_session_id: 1,
        }
    }

    /// Append an entry built from the session's counts and results
    pub fn record(
        &mut self,
        status: LogStatus,
        snapshot: &SessionSnapshot,
        results: Vec<ParticipantResult>,
    ) -> &ExperimentLogEntry {
        let entry = ExperimentLogEntry {
            session_id: self.next_session_id,
            timestamp: Utc::now(),
            participant_count: snapshot.participant_count,
            group_a_size: snapshot.group_a_count,
            group_b_size: snapshot.group_b_count,
            status,
            results,
        };
        self.next_session_id += 1;

        let index = self.entries.len();
        self.entries.push(entry);
        &self.entries[index]
    }

    pub fn entries(&self) -> &[ExperimentLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
