//! Timer state structure and the stopwatch engine that owns it

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utils::Clock;

/// Running/stopped state of the session stopwatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub is_running: bool,
    /// Wall-clock millis the current run began, `None` while stopped
    pub start_time: Option<i64>,
    /// Seconds accumulated by completed runs since the last reset
    pub elapsed_seconds: u64,
}

impl TimerState {
    /// Create a stopped timer with nothing accumulated
    pub fn new() -> Self {
        Self {
            is_running: false,
            start_time: None,
            elapsed_seconds: 0,
        }
    }

    /// Whole seconds between `start_time` and `now`, zero while stopped
    pub fn running_seconds(&self, now: i64) -> u64 {
        match self.start_time {
            Some(start) if self.is_running => whole_seconds_between(start, now),
            _ => 0,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

fn whole_seconds_between(start: i64, now: i64) -> u64 {
    // A clock stepping backwards counts as no time passed
    u64::try_from((now - start).div_euclid(1000)).unwrap_or(0)
}

/// Report returned by `getTime`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeReport {
    pub elapsed_seconds: u64,
    pub is_running: bool,
}

/// Stopwatch state machine with two states, stopped and running.
///
/// Every operation is a silent no-op on the wrong state. The engine keeps no
/// history; completed runs are handed back to the caller as deltas.
#[derive(Debug)]
pub struct TimerEngine {
    state: TimerState,
    /// Incremented on every start, lets periodic tasks detect a stale run
    generation: u64,
    clock: Arc<dyn Clock>,
}

impl TimerEngine {
    /// Create a stopped engine reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: TimerState::new(),
            generation: 0,
            clock,
        }
    }

    /// Start a run. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.state.is_running {
            debug!("Start ignored, timer already running");
            return false;
        }

        let now = self.clock.now_millis();
        self.state.start_time = Some(now);
        self.state.is_running = true;
        self.generation += 1;
        info!("Timer started at {} (run {})", now, self.generation);
        true
    }

    /// Stop the current run and return its length in whole seconds.
    pub fn stop(&mut self) -> u64 {
        self.stop_run().unwrap_or(0)
    }

    /// Stop the current run. Returns `None` when no run was in progress, so
    /// callers can tell a zero-second run from a stop that did nothing.
    pub fn stop_run(&mut self) -> Option<u64> {
        if !self.state.is_running {
            debug!("Stop ignored, timer not running");
            return None;
        }

        let delta = self.state.running_seconds(self.clock.now_millis());
        self.state.elapsed_seconds += delta;
        self.state.is_running = false;
        self.state.start_time = None;
        info!(
            "Timer stopped after {}s ({}s accumulated)",
            delta, self.state.elapsed_seconds
        );
        Some(delta)
    }

    /// Return to the initial stopped state with nothing accumulated
    pub fn reset(&mut self) {
        self.state = TimerState::new();
        info!("Timer reset");
    }

    /// Seconds accumulated so far including the current run
    pub fn current_time(&self) -> u64 {
        self.state.elapsed_seconds + self.state.running_seconds(self.clock.now_millis())
    }

    /// Check if a run is in progress
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Generation of the current (or most recent) run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reading returned by `getTime`
    pub fn report(&self) -> TimeReport {
        TimeReport {
            elapsed_seconds: self.current_time(),
            is_running: self.state.is_running,
        }
    }

    /// Get the raw timer state
    pub fn state(&self) -> &TimerState {
        &self.state
    }
}
