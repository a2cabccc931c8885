//! Shared application state for the choicelab server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use choicelab_core::{ExperimentConfig, QuestionGenerator, SessionCoordinator};
use tokio::sync::Mutex;

use crate::hub::ConnectionHub;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The single session coordinator; every mutation goes through this lock
    pub coordinator: Arc<Mutex<SessionCoordinator>>,
    /// Live WebSocket connections
    pub hub: Arc<ConnectionHub>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState with the default experiment settings
    pub fn new() -> Self {
        Self::with_config(ExperimentConfig::default())
    }

    /// Create AppState running the given experiment settings
    pub fn with_config(config: ExperimentConfig) -> Self {
        let hub = Arc::new(ConnectionHub::new());
        let coordinator = SessionCoordinator::new(config, hub.clone());
        Self::with_components(coordinator, hub)
    }

    /// Create AppState with a custom question generator (for testing)
    pub fn with_generator(
        config: ExperimentConfig,
        generator: Arc<dyn QuestionGenerator>,
    ) -> Self {
        let hub = Arc::new(ConnectionHub::new());
        let coordinator = SessionCoordinator::with_generator(config, generator, hub.clone());
        Self::with_components(coordinator, hub)
    }

    /// Create AppState from prebuilt components
    ///
    /// The coordinator should publish through `hub`, otherwise no events reach
    /// connections.
    pub fn with_components(coordinator: SessionCoordinator, hub: Arc<ConnectionHub>) -> Self {
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
            hub,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
