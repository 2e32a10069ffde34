//! Tick driver background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, trace};

use crate::{state::AppState, timer::TickHandle};

/// Background task that feeds fired ticks to the stopwatch controller
pub async fn tick_driver_task(state: Arc<AppState>, mut fired_rx: mpsc::UnboundedReceiver<TickHandle>) {
    info!("Starting tick driver task");

    while let Some(handle) = fired_rx.recv().await {
        match state.handle_tick(handle) {
            Ok(true) => trace!("Applied {}", handle),
            Ok(false) => trace!("Dropped stale {}", handle),
            Err(e) => error!("Failed to apply {}: {}", handle, e),
        }
    }

    info!("Tick channel closed, tick driver stopped");
}
