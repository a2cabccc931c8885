//! choicelab-core: Core library for live two-arm choice experiments
//!
//! This crate holds everything about a session that does not involve the
//! network:
//!
//! - **Session coordination** - [`SessionCoordinator`] drives the session
//!   state machine, dispatches questions and collects results
//! - **Participants** - [`ParticipantRegistry`] tracks who is connected and
//!   how far they are through the quiz
//! - **Group assignment** - [`GroupAssigner`] splits participants into the
//!   complex (A) and simple (B) arms
//! - **Questions** - [`QuestionGenerator`] trait with the built-in
//!   [`ArithmeticQuestionGenerator`]
//! - **Events** - [`Broadcaster`] trait and [`ServerEvent`] for delivering
//!   updates to participants and observers
//! - **Experiment log** - [`ExperimentLog`] of past sessions
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use choicelab_core::{ExperimentConfig, FinalChoice, MemoryBroadcaster, SessionCoordinator};
//!
//! let broadcaster = Arc::new(MemoryBroadcaster::new());
//! let mut coordinator = SessionCoordinator::new(ExperimentConfig::default(), broadcaster);
//!
//! coordinator.join("alice").unwrap();
//! coordinator.start().unwrap();
//! coordinator.submit_final_choice("alice", FinalChoice::Safe).unwrap();
//!
//! assert_eq!(coordinator.results().len(), 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              SessionCoordinator              │
//! │  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │ ParticipantReg.  │  │  GroupAssigner   │  │
//! │  └──────────────────┘  └──────────────────┘  │
//! │  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │ QuestionGenerator│  │  ExperimentLog   │  │
//! │  └──────────────────┘  └──────────────────┘  │
//! └──────────────────────┬───────────────────────┘
//!                        │ ServerEvent
//!                  ┌─────▼─────┐
//!                  │Broadcaster│
//!                  └───────────┘
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod groups;
pub mod log;
pub mod participant;
pub mod questions;
pub mod session;

// Re-export key types for convenience
pub use config::{DEFAULT_QUIZ_LENGTH, ExperimentConfig, QuizProfile};
pub use error::{ConfigError, SessionError};
pub use events::{
    Audience, Broadcaster, MemoryBroadcaster, QuestionPayload, ServerEvent, SessionSnapshot,
};
pub use groups::{GroupAssigner, GroupSplit};
pub use log::{ExperimentLog, ExperimentLogEntry, LogStatus};
pub use participant::{
    AnswerRecord, FinalChoice, Group, Participant, ParticipantId, ParticipantRegistry,
};
pub use questions::{ArithmeticQuestionGenerator, Difficulty, Question, QuestionGenerator};
pub use session::{
    AnswerSubmission, ChoiceTally, ParticipantResult, ResultsSummary, SessionCoordinator,
    SessionPhase,
};
