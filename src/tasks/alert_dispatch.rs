//! Alert dispatch background task

use std::collections::HashMap;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{
    services::{close_desktop_notification, show_desktop_notification},
    timer::AlertEvent,
};

/// Background task that mirrors alert events on the desktop
pub async fn alert_dispatch_task(mut events_rx: broadcast::Receiver<AlertEvent>, notify_command: String) {
    info!("Starting alert dispatch task using {}", notify_command);

    // alert id -> id assigned by the desktop notification service
    let mut shown: HashMap<u32, u32> = HashMap::new();

    loop {
        match events_rx.recv().await {
            Ok(AlertEvent::ChannelRegistered(channel)) => {
                debug!("Alert channel {} registered", channel.id);
            }
            Ok(AlertEvent::Shown(alert)) => {
                match show_desktop_notification(&notify_command, &alert).await {
                    Ok(Some(desktop_id)) => {
                        shown.insert(alert.id, desktop_id);
                    }
                    Ok(None) => debug!("Desktop did not report an id for alert {}", alert.id),
                    Err(e) => warn!("Failed to show desktop alert: {}", e),
                }
            }
            Ok(AlertEvent::Cancelled { id }) => {
                if let Some(desktop_id) = shown.remove(&id) {
                    if let Err(e) = close_desktop_notification(desktop_id).await {
                        warn!("Failed to close desktop alert: {}", e);
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Alert dispatch lagged behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Alert channel closed, alert dispatch stopped");
                break;
            }
        }
    }
}
