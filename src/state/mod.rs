//! State management module
//!
//! This module contains the timer state machine, the badge and the shared
//! application state handed to the HTTP layer.

pub mod app_state;
pub mod badge;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use badge::{badge_text, Badge, BADGE_COLOR};
pub use timer_state::{TimeReport, TimerEngine, TimerState};
