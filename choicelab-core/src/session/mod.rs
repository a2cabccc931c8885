//! The session coordinator and the records it produces

mod coordinator;
mod results;
mod state;

pub use coordinator::{AnswerSubmission, SessionCoordinator};
pub use results::{ChoiceTally, ParticipantResult, ResultsSummary};
pub use state::SessionPhase;
