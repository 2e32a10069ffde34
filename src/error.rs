//! Error types shared by the controller and the HTTP layer

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The limit can only be edited while the stopwatch is stopped
    #[error("time limit cannot be changed while the stopwatch is running")]
    LimitLocked,

    #[error("failed to lock timer controller: {0}")]
    StateLock(String),
}

impl TimerError {
    /// HTTP status used when this error reaches an endpoint
    pub fn status_code(&self) -> StatusCode {
        match self {
            TimerError::LimitLocked => StatusCode::CONFLICT,
            TimerError::StateLock(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
