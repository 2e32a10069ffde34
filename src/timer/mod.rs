//! Stopwatch timing module
//!
//! The controller holds the tick state machine; the scheduler and notifier
//! are the collaborators it drives.

pub mod controller;
pub mod notifier;
pub mod scheduler;

// Re-export main types
pub use controller::{TimerController, TICK_INTERVAL};
pub use notifier::{Alert, AlertChannel, AlertEvent, AlertStyle, ChannelNotifier, Notifier};
pub use scheduler::{Scheduler, TickHandle, TokioScheduler};

/// Controller wired to the runtime collaborators
pub type StopwatchController = TimerController<TokioScheduler, ChannelNotifier>;
