//! Main application state management

use std::{
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use super::TimerSnapshot;
use crate::{
    error::TimerError,
    timer::{
        notifier::OVERTIME_ALERT_ID, Alert, AlertEvent, ChannelNotifier, Notifier,
        StopwatchController, TickHandle, TimerController, TokioScheduler,
    },
};

/// Main application state that owns the stopwatch controller
#[derive(Debug)]
pub struct AppState {
    /// The stopwatch; every mutation goes through this lock
    pub controller: Mutex<StopwatchController>,
    /// Channel the notifier publishes alert events on
    pub alert_tx: broadcast::Sender<AlertEvent>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the state and the receiver fired ticks are delivered to.
    ///
    /// The controller is initialized here, so the alert channel is registered
    /// before anything can be shown on it.
    pub fn new(
        port: u16,
        host: String,
        tick_interval: Duration,
        initial_limit: Option<&str>,
    ) -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (alert_tx, _) = broadcast::channel(16);
        let (scheduler, fired_rx) = TokioScheduler::new();
        let notifier = ChannelNotifier::new(alert_tx.clone());

        let mut controller = TimerController::new(scheduler, notifier, tick_interval);
        controller.init();
        // not running yet, so the limit is always editable here
        if let Err(e) = controller.set_limit(initial_limit) {
            warn!("Failed to apply initial limit: {}", e);
        }

        let state = Self {
            controller: Mutex::new(controller),
            alert_tx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        };
        (state, fired_rx)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StopwatchController>, TimerError> {
        self.controller
            .lock()
            .map_err(|e| TimerError::StateLock(e.to_string()))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start the stopwatch; returns whether it was started by this call
    pub fn start(&self) -> Result<(bool, TimerSnapshot), TimerError> {
        let mut controller = self.lock()?;
        let started = controller.start();
        let snapshot = controller.snapshot();
        drop(controller);

        self.record_action("start");
        Ok((started, snapshot))
    }

    /// Reset the stopwatch and dismiss the alert
    pub fn reset(&self) -> Result<TimerSnapshot, TimerError> {
        let mut controller = self.lock()?;
        controller.reset();
        let snapshot = controller.snapshot();
        drop(controller);

        self.record_action("reset");
        Ok(snapshot)
    }

    /// Apply raw limit input from the settings prompt
    pub fn set_limit(&self, raw: Option<&str>) -> Result<TimerSnapshot, TimerError> {
        let mut controller = self.lock()?;
        controller.set_limit(raw)?;
        let snapshot = controller.snapshot();
        drop(controller);

        self.record_action("limit");
        Ok(snapshot)
    }

    /// Feed a fired tick to the controller
    pub fn handle_tick(&self, handle: TickHandle) -> Result<bool, TimerError> {
        Ok(self.lock()?.tick(handle))
    }

    /// User dismissed the active alert. Returns whether there was one to dismiss.
    pub fn dismiss_alert(&self) -> Result<bool, TimerError> {
        let mut controller = self.lock()?;
        let dismissible = controller
            .notifier()
            .active()
            .map(|alert| alert.auto_cancel)
            .unwrap_or(false);
        if dismissible {
            controller.notifier_mut().cancel(OVERTIME_ALERT_ID);
        }
        drop(controller);

        self.record_action("dismiss");
        Ok(dismissible)
    }

    /// Cancel any pending tick before shutdown
    pub fn dispose(&self) -> Result<(), TimerError> {
        self.lock()?.dispose();
        info!("Stopwatch disposed");
        Ok(())
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        Ok(self.lock()?.snapshot())
    }

    pub fn active_alert(&self) -> Result<Option<Alert>, TimerError> {
        Ok(self.lock()?.notifier().active().cloned())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
