use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// The host side of a recording went away; the recording session is over.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Host transport closed: {0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame coordinator unavailable: {0}")]
    Coordinator(String),

    #[error("Frame coordination timed out after {0}ms")]
    Timeout(u64),
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Test case not found: {0}")]
    TestNotFound(String),

    #[error("Call stack is empty")]
    EmptyStack,

    #[error("Call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("No test case is running")]
    NothingRunning,

    #[error("Playback cancelled")]
    Cancelled,

    #[error("Command {index} ({command}) failed: {source}")]
    CommandFailed {
        index: usize,
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Recording error: {0}")]
    RecordingError(String),

    #[error("Playback error: {0}")]
    PlaybackError(#[from] PlaybackError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            AppError::RecordingError(_) => (StatusCode::CONFLICT, "Recording Error"),
            AppError::PlaybackError(
                PlaybackError::TestNotFound(_) | PlaybackError::CallDepthExceeded(_),
            ) => (StatusCode::UNPROCESSABLE_ENTITY, "Playback Error"),
            AppError::PlaybackError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Playback Error"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
