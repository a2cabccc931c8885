//! Participant data model

use serde::{Deserialize, Serialize};

use crate::questions::Difficulty;

/// Opaque connection identifier, also used as the join/leave key
pub type ParticipantId = String;

/// Treatment arm a participant is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// Receives complex algebra questions
    GroupA,
    /// Receives single-digit addition questions
    GroupB,
}

impl Group {
    /// Question difficulty served to this arm
    pub fn difficulty(self) -> Difficulty {
        match self {
            Group::GroupA => Difficulty::Complex,
            Group::GroupB => Difficulty::Simple,
        }
    }
}

/// The risky-vs-safe decision captured at the end of the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalChoice {
    #[serde(rename = "risky", alias = "100-risky")]
    Risky,
    #[serde(rename = "safe", alias = "50-safe")]
    Safe,
}

/// One answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_text: String,
    /// `None` when the client's timer ran out before an answer was picked
    pub chosen_answer: Option<i64>,
    /// Correctness as reported by the client
    pub was_correct: bool,
    /// Zero-based position of the question in the participant's quiz
    pub question_index: usize,
}

/// A connected subject progressing through the quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub group: Option<Group>,
    /// Number of questions already answered
    pub question_index: usize,
    pub answers: Vec<AnswerRecord>,
    pub final_choice: Option<FinalChoice>,
    pub completed: bool,
}

impl Participant {
    /// Create an unassigned participant at the start of the quiz
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            group: None,
            question_index: 0,
            answers: Vec::new(),
            final_choice: None,
            completed: false,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.group.is_some()
    }

    /// Whether every question of a quiz of `quiz_length` has been answered
    pub fn finished_quiz(&self, quiz_length: usize) -> bool {
        self.question_index >= quiz_length
    }

    /// Whether this participant counts toward session-wide completion
    pub fn is_done(&self, quiz_length: usize) -> bool {
        self.finished_quiz(quiz_length) || self.completed
    }
}
