//! Session phase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of the single active session
///
/// `Resetting` only exists while a reset or stop tears the session down; the
/// coordinator always leaves it in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Accepting joins; nothing has been dispatched
    #[default]
    Idle,
    /// Quiz in progress; answers and choices accepted, late joiners assigned
    Running,
    /// Tearing down after reset/stop
    Resetting,
}

impl SessionPhase {
    pub fn is_running(self) -> bool {
        matches!(self, SessionPhase::Running)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "Idle"),
            SessionPhase::Running => write!(f, "Running"),
            SessionPhase::Resetting => write!(f, "Resetting"),
        }
    }
}
