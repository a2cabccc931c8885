//! Events the coordinator publishes and the audiences they address

use serde::{Deserialize, Serialize};

use crate::log::ExperimentLogEntry;
use crate::participant::{Group, ParticipantId};
use crate::session::{ParticipantResult, ResultsSummary};

/// Text sent with the `waiting` event
pub const WAITING_MESSAGE: &str = "Waiting for session to start...";

/// Who an event is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Audience {
    /// A single connection
    Individual(ParticipantId),
    /// Every connection subscribed to session-management broadcasts
    AdminGroup,
    /// Every connection
    All,
}

/// Aggregate counts shown on the observer console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub participant_count: usize,
    pub group_a_count: usize,
    pub group_b_count: usize,
    pub session_active: bool,
    pub session_started: bool,
}

/// A question as delivered to a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    /// Zero-based position of this question in the participant's quiz
    pub question_index: usize,
    pub total_questions: usize,
    pub question_text: String,
    pub options: Vec<i64>,
    pub correct_answer: i64,
    pub group: Group,
}

/// Messages sent from the server to connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    // Participant-facing
    Waiting {
        message: String,
    },
    Question(QuestionPayload),
    ShowFinalChoicePrompt,
    ExperimentComplete,
    SessionEnded,

    // Admin-facing
    SessionSnapshot(SessionSnapshot),
    ParticipantCompleted {
        completed_count: usize,
        total_count: usize,
    },
    AllComplete,
    ResultsData {
        results: Vec<ParticipantResult>,
        summary: ResultsSummary,
    },
    ExperimentLogs {
        entries: Vec<ExperimentLogEntry>,
    },
    SessionReset,

    /// Protocol-level error reported to the sending connection only
    Error {
        message: String,
        code: String,
    },
}

impl ServerEvent {
    pub fn waiting() -> Self {
        ServerEvent::Waiting {
            message: WAITING_MESSAGE.to_string(),
        }
    }

    /// The wire tag, e.g. `"session_snapshot"`
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Waiting { .. } => "waiting",
            ServerEvent::Question(_) => "question",
            ServerEvent::ShowFinalChoicePrompt => "show_final_choice_prompt",
            ServerEvent::ExperimentComplete => "experiment_complete",
            ServerEvent::SessionEnded => "session_ended",
            ServerEvent::SessionSnapshot(_) => "session_snapshot",
            ServerEvent::ParticipantCompleted { .. } => "participant_completed",
            ServerEvent::AllComplete => "all_complete",
            ServerEvent::ResultsData { .. } => "results_data",
            ServerEvent::ExperimentLogs { .. } => "experiment_logs",
            ServerEvent::SessionReset => "session_reset",
            ServerEvent::Error { .. } => "error",
        }
    }
}
