//! Timer service module
//!
//! This module contains the command protocol and the task that owns the
//! stopwatch engine.

pub mod protocol;
pub mod timer;

// Re-export main items
pub use protocol::{Command, Response, StopReport};
pub use timer::{spawn_timer_service, TimerHandle, WeakTimerHandle};
