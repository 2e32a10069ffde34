//! Stopwatch - a stopwatch daemon with a time limit alert
//!
//! The stopwatch counts seconds, cycles an indicator color on every tick and
//! raises a single alert per run once the elapsed time passes a configured
//! limit. It is controlled over a small HTTP API and forwards its alert to
//! the desktop notification service.

pub mod config;
pub mod error;
pub mod state;
pub mod timer;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
