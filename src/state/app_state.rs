//! Main application state shared with the HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::info;

use super::{Badge, TimerEngine};
use crate::{
    config::Config,
    controller::PopupController,
    services::{spawn_timer_service, TimerHandle},
    store::{KeyValueStore, SessionStore},
    utils::Clock,
};

/// Application state: the timer service handle, the session store and the
/// popup hosted by this process
#[derive(Debug)]
pub struct AppState {
    /// Command channel into the timer service
    pub timer: TimerHandle,
    /// Latest badge published by the timer service
    pub badge_rx: watch::Receiver<Badge>,
    pub store: Arc<SessionStore>,
    pub popup: PopupController,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Spawn the timer service and wire the store and popup around it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch(config: &Config, backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let engine = TimerEngine::new(Arc::clone(&clock));
        let (timer, badge_rx) = spawn_timer_service(engine, config.badge_interval());
        let store = Arc::new(SessionStore::new(backend, clock));
        let popup = PopupController::new(timer.clone(), Arc::clone(&store), config.poll_interval());

        info!(
            "Timer service ready (badge every {}ms, popup poll every {}ms)",
            config.badge_interval_ms, config.poll_interval_ms
        );

        Self {
            timer,
            badge_rx,
            store,
            popup,
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Current badge
    pub fn badge(&self) -> Badge {
        self.badge_rx.borrow().clone()
    }

    /// Remember the most recent mutating action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
