//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{error::TimerError, state::AppState};
use super::responses::{ApiResponse, ErrorResponse, HealthResponse, LimitRequest, StatusResponse};

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(context: &str, e: TimerError) -> HandlerError {
    match e {
        TimerError::LimitLocked => warn!("{}: {}", context, e),
        TimerError::StateLock(_) => error!("{}: {}", context, e),
    }
    (e.status_code(), Json(ErrorResponse::new(e.to_string())))
}

/// Handle POST /start - Start the stopwatch
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, HandlerError> {
    let (started, timer) = state.start().map_err(|e| reject("Failed to start stopwatch", e))?;

    let message = if started {
        info!("Start endpoint called - stopwatch started");
        "Stopwatch started"
    } else {
        "Stopwatch already running"
    };
    Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
}

/// Handle POST /reset - Stop and zero the stopwatch
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, HandlerError> {
    let timer = state.reset().map_err(|e| reject("Failed to reset stopwatch", e))?;

    info!("Reset endpoint called - stopwatch reset");
    Ok(Json(ApiResponse::from_timer("Stopwatch reset".to_string(), timer)))
}

/// Handle POST /limit - Apply settings input
pub async fn limit_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, HandlerError> {
    let request = LimitRequest::from_body(&body);
    let timer = state
        .set_limit(request.limit.as_deref())
        .map_err(|e| reject("Failed to set time limit", e))?;

    let message = match timer.limit_seconds {
        Some(limit) => format!("Time limit set to {} seconds", limit),
        None => "Time limit cleared".to_string(),
    };
    Ok(Json(ApiResponse::from_timer(message, timer)))
}

/// Handle POST /alert/dismiss - The user acted on the alert
pub async fn dismiss_alert_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, HandlerError> {
    let dismissed = state.dismiss_alert().map_err(|e| reject("Failed to dismiss alert", e))?;
    let timer = state.snapshot().map_err(|e| reject("Failed to read stopwatch", e))?;

    let message = if dismissed { "Alert dismissed" } else { "No alert to dismiss" };
    Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
}

/// Handle GET /status - Return the stopwatch screen and server information
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, HandlerError> {
    let timer = state.snapshot().map_err(|e| reject("Failed to read stopwatch", e))?;
    let active_alert = state.active_alert().map_err(|e| reject("Failed to read active alert", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        active_alert,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
