//! Participants and the registry that tracks their progress

mod registry;
mod types;

pub use registry::ParticipantRegistry;
pub use types::{AnswerRecord, FinalChoice, Group, Participant, ParticipantId};
