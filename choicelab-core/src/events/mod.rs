//! Outbound event model and the broadcaster boundary

pub mod broadcaster;
pub mod memory;
pub mod types;

pub use broadcaster::Broadcaster;
pub use memory::MemoryBroadcaster;
pub use types::{Audience, QuestionPayload, ServerEvent, SessionSnapshot, WAITING_MESSAGE};
