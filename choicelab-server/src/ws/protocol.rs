//! WebSocket protocol message types
//!
//! Participants and the observer console share one endpoint and one message
//! vocabulary. Outbound frames are [`ServerEvent`]s serialized as-is.

use choicelab_core::{FinalChoice, ServerEvent};
use serde::{Deserialize, Serialize};

use crate::ServerError;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    // Participant actions
    /// Register this connection as a participant
    Join,

    /// Answer to the current question
    SubmitAnswer {
        /// Text of the question being answered
        question_text: String,
        /// Chosen option, `null` on timeout
        #[serde(default)]
        answer: Option<i64>,
        /// Client-side correctness verdict
        correct: bool,
    },

    /// Final risky/safe choice
    SubmitFinalChoice {
        choice: FinalChoice,
    },

    // Admin actions
    /// Subscribe this connection to session-management broadcasts
    AdminJoin,

    /// Start the session
    Start,

    /// Ask for the current results
    RequestResults,

    /// Ask for the experiment log
    GetLogs,

    /// End the session and log it if anyone finished
    Reset,

    /// Abort the session
    Stop,
}

impl ClientMessage {
    /// The wire tag of this message
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Join => "join",
            ClientMessage::SubmitAnswer { .. } => "submit_answer",
            ClientMessage::SubmitFinalChoice { .. } => "submit_final_choice",
            ClientMessage::AdminJoin => "admin_join",
            ClientMessage::Start => "start",
            ClientMessage::RequestResults => "request_results",
            ClientMessage::GetLogs => "get_logs",
            ClientMessage::Reset => "reset",
            ClientMessage::Stop => "stop",
        }
    }

    /// Parse a text frame
    pub fn parse(text: &str) -> Result<Self, ServerError> {
        serde_json::from_str(text).map_err(|e| ServerError::InvalidMessage(e.to_string()))
    }
}

/// Build the `error` frame sent back to a client
pub fn error_event(err: &ServerError) -> ServerEvent {
    ServerEvent::Error {
        message: err.to_string(),
        code: err.code().to_string(),
    }
}
