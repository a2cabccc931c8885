//! Error types for choicelab-core

use thiserror::Error;

/// Errors raised by the registry and the session coordinator
///
/// None of these are fatal. The transport logs them and drops the action,
/// leaving session state exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Participant already joined: {0}")]
    DuplicateParticipant(String),

    #[error("Participant already made a final choice: {0}")]
    AlreadyCompleted(String),

    #[error("Participant already answered every question: {0}")]
    QuizFinished(String),

    /// Guards the grouping invariant; join and start assign everyone who can act
    #[error("Participant has no group assignment: {0}")]
    NotAssigned(String),

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: String, to: String },

    #[error("Invalid phase: expected {expected}, got {actual}")]
    InvalidPhase { expected: String, actual: String },
}

/// Errors raised while building an experiment configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Quiz length must be at least 1, got {0}")]
    InvalidQuizLength(usize),

    #[error("Unknown quiz profile: {0} (expected 'standard' or 'extended')")]
    UnknownProfile(String),
}
