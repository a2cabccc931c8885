//! Server error types

use thiserror::Error;

/// Errors that can occur in the choicelab server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// WebSocket error
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Invalid message format
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<axum::Error> for ServerError {
    fn from(err: axum::Error) -> Self {
        ServerError::WebSocket(err.to_string())
    }
}

impl ServerError {
    /// Machine-readable code sent in `error` frames
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Bind { .. } => "BIND_FAILED",
            ServerError::WebSocket(_) => "WEBSOCKET_ERROR",
            ServerError::InvalidMessage(_) => "INVALID_MESSAGE",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
