//! Background tasks module
//!
//! This module contains the periodic tasks that run alongside the HTTP server
//! and the timer service.

pub mod badge_refresh;
pub mod keep_alive;
pub mod ui_poll;

// Re-export main functions
pub use badge_refresh::badge_refresh_task;
pub use keep_alive::keep_alive_task;
pub use ui_poll::ui_poll_task;
