//! State management module
//!
//! This module contains the stopwatch state and the process-wide state that owns it.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{format_elapsed, IndicatorColor, TimeLimit, TimerSnapshot, TimerState};
