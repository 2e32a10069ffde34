//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{state::TimerSnapshot, timer::Alert};

/// API response structure for stopwatch actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a response whose status follows the stopwatch
    pub fn from_timer(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.running { "running" } else { "idle" };
        Self::new(status.to_string(), message, timer)
    }
}

/// Body of POST /limit; a missing value clears the limit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRequest {
    #[serde(default)]
    pub limit: Option<String>,
}

impl LimitRequest {
    /// Read settings input from a raw request body.
    ///
    /// A string or a number in `limit` is kept as text for limit parsing.
    /// Empty, non-JSON or otherwise shaped bodies carry no limit.
    pub fn from_body(body: &[u8]) -> Self {
        let limit = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(mut fields)) => match fields.remove("limit") {
                Some(Value::String(raw)) => Some(raw),
                Some(Value::Number(number)) => Some(number.to_string()),
                _ => None,
            },
            _ => None,
        };
        Self { limit }
    }
}

/// Error body returned alongside non-2xx status codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Status response with alert and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub active_alert: Option<Alert>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
