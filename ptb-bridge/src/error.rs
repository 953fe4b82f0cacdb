//! Error types for ptb-bridge
//!
//! The protocol-side taxonomy keeps transport failures ("we couldn't talk
//! to the workstation") distinct from command failures ("the workstation
//! rejected this") so callers can render specific messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors from the protocol client and its typed wrappers
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Schema path missing or channel unreachable; fatal to the session,
    /// never retried internally
    #[error("Connection error: {0}")]
    Connection(String),

    /// Mid-request channel failure; the session is no longer usable
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The remote workstation returned a failed status for a command
    #[error("Command '{command}' failed: {}", .messages.join(", "))]
    CommandFailed {
        command: String,
        messages: Vec<String>,
    },

    /// The client is not in a state that accepts this call
    #[error("Client not ready: {0}")]
    NotReady(String),

    /// ptb-common error (config, IO)
    #[error(transparent)]
    Common(#[from] ptb_common::Error),
}

/// API error type for the HTTP boundary
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400) — unknown tool, malformed args
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Write operation blocked by the permission policy (403)
    #[error("{0}")]
    Forbidden(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Bridge error surfaced through a handler
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Bridge(err) => {
                let status = match err {
                    // The workstation is unreachable, not the bridge itself
                    BridgeError::Connection(_) | BridgeError::Transport(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
