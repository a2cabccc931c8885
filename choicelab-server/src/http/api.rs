//! REST API handlers
//!
//! Read-only views of the coordinator. Every mutation goes through the
//! WebSocket endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use choicelab_core::{ExperimentLogEntry, SessionSnapshot};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of registered participants
    pub participant_count: usize,
}

/// Health check endpoint
///
/// Returns server status, version, uptime, and participant count.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let participant_count = state.coordinator.lock().await.registry().count();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        participant_count,
    })
}

/// GET /api/session - Current session counts
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.coordinator.lock().await.snapshot())
}

/// Response for the experiment log
#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub entries: Vec<ExperimentLogEntry>,
}

/// GET /api/logs - Past sessions
///
/// Unlike the `get_logs` WebSocket message this does not broadcast.
pub async fn list_logs(State(state): State<Arc<AppState>>) -> Json<LogsResponse> {
    let entries = state.coordinator.lock().await.log().entries().to_vec();
    Json(LogsResponse { entries })
}
