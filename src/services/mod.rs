//! External service module
//!
//! This module contains functions for talking to the desktop notification service.

pub mod desktop;

// Re-export main functions
pub use desktop::*;
