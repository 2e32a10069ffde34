//! User-visible alerts

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Channel every stopwatch alert is posted on
pub const CHANNEL_ID: &str = "org.example";
/// Id of the overtime alert, reused so there is never more than one
pub const OVERTIME_ALERT_ID: u32 = 393939;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Default,
    High,
}

/// A category alerts are posted under; must be registered before use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

impl AlertChannel {
    pub fn stopwatch() -> Self {
        Self {
            id: CHANNEL_ID.to_string(),
            name: "Stopwatch".to_string(),
            description: "Alerts when the stopwatch runs past its time limit".to_string(),
            importance: Importance::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStyle {
    /// Keeps repeating its cue until dismissed
    Insistent,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub style: AlertStyle,
    /// Dismissed when the user acts on it
    pub auto_cancel: bool,
    /// Updates to an already shown alert are silent
    pub only_alert_once: bool,
}

impl Alert {
    pub fn overtime() -> Self {
        Self {
            id: OVERTIME_ALERT_ID,
            channel_id: CHANNEL_ID.to_string(),
            title: "Time is up".to_string(),
            body: "The stopwatch has run past its time limit.".to_string(),
            style: AlertStyle::Insistent,
            auto_cancel: true,
            only_alert_once: true,
        }
    }
}

/// Alert lifecycle as seen by subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    ChannelRegistered(AlertChannel),
    Shown(Alert),
    Cancelled { id: u32 },
}

/// Displays and cancels alerts
pub trait Notifier {
    fn register_channel(&mut self, channel: &AlertChannel);

    fn show(&mut self, alert: &Alert);

    fn cancel(&mut self, id: u32);
}

/// Notifier that remembers the active alert and publishes every change on a
/// broadcast channel. Having no subscribers is not an error.
#[derive(Debug)]
pub struct ChannelNotifier {
    channels: Vec<AlertChannel>,
    active: Option<Alert>,
    events_tx: broadcast::Sender<AlertEvent>,
}

impl ChannelNotifier {
    pub fn new(events_tx: broadcast::Sender<AlertEvent>) -> Self {
        Self {
            channels: Vec::new(),
            active: None,
            events_tx,
        }
    }

    pub fn active(&self) -> Option<&Alert> {
        self.active.as_ref()
    }

    pub fn is_registered(&self, channel_id: &str) -> bool {
        self.channels.iter().any(|channel| channel.id == channel_id)
    }

    fn publish(&self, event: AlertEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("No alert subscribers");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn register_channel(&mut self, channel: &AlertChannel) {
        if self.is_registered(&channel.id) {
            debug!("Alert channel {} already registered", channel.id);
            return;
        }
        info!("Registered alert channel {} ({:?} importance)", channel.id, channel.importance);
        self.channels.push(channel.clone());
        self.publish(AlertEvent::ChannelRegistered(channel.clone()));
    }

    fn show(&mut self, alert: &Alert) {
        if !self.is_registered(&alert.channel_id) {
            warn!("Dropping alert {}: channel {} is not registered", alert.id, alert.channel_id);
            return;
        }

        if let Some(active) = &self.active {
            if active.id == alert.id && alert.only_alert_once {
                debug!("Alert {} already shown, updating silently", alert.id);
                self.active = Some(alert.clone());
                return;
            }
        }

        info!("Showing alert {}: {}", alert.id, alert.title);
        self.active = Some(alert.clone());
        self.publish(AlertEvent::Shown(alert.clone()));
    }

    fn cancel(&mut self, id: u32) {
        match &self.active {
            Some(active) if active.id == id => {
                info!("Cancelling alert {}", id);
                self.active = None;
                self.publish(AlertEvent::Cancelled { id });
            }
            _ => debug!("No active alert {} to cancel", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> (ChannelNotifier, broadcast::Receiver<AlertEvent>) {
        let (events_tx, events_rx) = broadcast::channel(16);
        (ChannelNotifier::new(events_tx), events_rx)
    }

    #[test]
    fn alerts_on_unregistered_channels_are_dropped() {
        let (mut notifier, mut events_rx) = notifier();
        notifier.show(&Alert::overtime());

        assert!(notifier.active().is_none());
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn channel_is_registered_once() {
        let (mut notifier, mut events_rx) = notifier();
        notifier.register_channel(&AlertChannel::stopwatch());
        notifier.register_channel(&AlertChannel::stopwatch());

        assert_eq!(
            events_rx.try_recv().ok(),
            Some(AlertEvent::ChannelRegistered(AlertChannel::stopwatch()))
        );
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn show_then_cancel_publishes_both() {
        let (mut notifier, mut events_rx) = notifier();
        notifier.register_channel(&AlertChannel::stopwatch());
        let _ = events_rx.try_recv();

        notifier.show(&Alert::overtime());
        assert_eq!(notifier.active(), Some(&Alert::overtime()));
        assert_eq!(events_rx.try_recv().ok(), Some(AlertEvent::Shown(Alert::overtime())));

        notifier.cancel(OVERTIME_ALERT_ID);
        assert!(notifier.active().is_none());
        assert_eq!(
            events_rx.try_recv().ok(),
            Some(AlertEvent::Cancelled { id: OVERTIME_ALERT_ID })
        );
    }

    #[test]
    fn repeated_show_alerts_once() {
        let (mut notifier, mut events_rx) = notifier();
        notifier.register_channel(&AlertChannel::stopwatch());
        let _ = events_rx.try_recv();

        notifier.show(&Alert::overtime());
        notifier.show(&Alert::overtime());

        assert!(matches!(events_rx.try_recv(), Ok(AlertEvent::Shown(_))));
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn cancelling_unknown_alert_is_ignored() {
        let (mut notifier, mut events_rx) = notifier();
        notifier.cancel(7);
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn works_without_subscribers() {
        let (events_tx, _) = broadcast::channel(4);
        let mut notifier = ChannelNotifier::new(events_tx);
        notifier.register_channel(&AlertChannel::stopwatch());
        notifier.show(&Alert::overtime());
        assert!(notifier.active().is_some());
    }
}
