//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::AppState;
use crate::ws::ws_handler;

pub use api::{HealthResponse, LogsResponse};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/session", get(api::get_session))
        .route("/api/logs", get(api::list_logs))
        .route("/ws", get(ws_handler))
        .with_state(state)
}
