//! Session Timer - A background stopwatch with persisted session history
//!
//! This library provides the timer service that owns the running/stopped
//! state, the session store that keeps the cumulative total and recent
//! sessions, and the popup controller that drives both over the command
//! channel.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use controller::PopupController;
pub use services::{Command, Response, TimerHandle};
pub use state::{AppState, TimerEngine};
pub use store::SessionStore;
pub use utils::shutdown_signal;
