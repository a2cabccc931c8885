//! Question generation
//!
//! The coordinator only needs something that turns a difficulty tier into a
//! question payload. [`ArithmeticQuestionGenerator`] is the built-in
//! implementation; tests and alternative deployments can plug in their own.

mod arithmetic;

use serde::{Deserialize, Serialize};

pub use arithmetic::ArithmeticQuestionGenerator;

/// Difficulty tier of a generated question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Algebra and calculus with plausible distractors
    Complex,
    /// Single-digit addition with obviously wrong distractors
    Simple,
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Distinct answer options, one of which is `correct_answer`
    pub options: Vec<i64>,
    pub correct_answer: i64,
}

/// Produces a question for a difficulty tier
///
/// Implementations hold no per-session state.
pub trait QuestionGenerator: Send + Sync {
    fn generate(&self, difficulty: Difficulty) -> Question;
}
