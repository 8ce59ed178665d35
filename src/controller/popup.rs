//! Popup controller: the transient UI side of the command channel.
//!
//! The controller never keeps time. It asks the timer service for the current
//! reading, forwards completed runs to the session store and keeps a
//! [`PopupView`] current for whatever renders it.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

use super::PopupView;
use crate::{
    error::PopupError,
    services::TimerHandle,
    store::SessionStore,
    tasks::ui_poll_task,
};

#[derive(Debug)]
pub struct PopupController {
    timer: TimerHandle,
    store: Arc<SessionStore>,
    view_tx: Arc<watch::Sender<PopupView>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    poll_interval: Duration,
}

impl PopupController {
    /// Create a closed popup; call [`PopupController::open`] to load data
    pub fn new(timer: TimerHandle, store: Arc<SessionStore>, poll_interval: Duration) -> Self {
        let (view_tx, _) = watch::channel(PopupView::new());
        Self {
            timer,
            store,
            view_tx: Arc::new(view_tx),
            poller: Mutex::new(None),
            poll_interval,
        }
    }

    /// Current view
    pub fn view(&self) -> PopupView {
        self.view_tx.borrow().clone()
    }

    /// Receive every view change, including live time updates
    pub fn subscribe(&self) -> watch::Receiver<PopupView> {
        self.view_tx.subscribe()
    }

    /// Load saved data and pick up a run that is already in progress
    pub async fn open(&self) -> Result<PopupView, PopupError> {
        let snapshot = self.store.snapshot();
        let report = self.timer.get_time().await?;

        self.view_tx.send_modify(|view| {
            view.apply_snapshot(&snapshot);
            view.set_running(report.is_running);
            view.set_current(if report.is_running { report.elapsed_seconds } else { 0 });
        });

        if report.is_running {
            self.start_polling();
        }

        debug!("Popup opened (running={})", report.is_running);
        Ok(self.view())
    }

    /// Start when stopped, stop when running
    pub async fn toggle(&self) -> Result<PopupView, PopupError> {
        if self.view_tx.borrow().is_running {
            self.stop().await
        } else {
            self.start().await
        }
    }

    /// Start the timer and begin polling for display
    pub async fn start(&self) -> Result<PopupView, PopupError> {
        self.timer.start().await?;
        self.start_polling();
        self.view_tx.send_modify(|view| view.set_running(true));

        info!("Popup started the timer");
        Ok(self.view())
    }

    /// Stop the timer and record the finished run. When no run was in
    /// progress the store is left alone and only the view is refreshed.
    pub async fn stop(&self) -> Result<PopupView, PopupError> {
        let finished = self.timer.stop_run().await?;
        self.stop_polling();
        self.view_tx.send_modify(|view| {
            view.set_running(false);
            view.set_current(0);
        });

        let snapshot = match finished {
            Some(elapsed) => {
                let snapshot = self.store.record_session(elapsed)?;
                info!(
                    "Popup stopped the timer after {}s, total {}s",
                    elapsed, snapshot.total_time
                );
                snapshot
            }
            None => {
                debug!("Popup stop with no run in progress, nothing recorded");
                self.store.snapshot()
            }
        };
        self.view_tx.send_modify(|view| view.apply_snapshot(&snapshot));

        Ok(self.view())
    }

    /// Reset the timer and wipe the stored history and total
    pub async fn reset(&self) -> Result<PopupView, PopupError> {
        self.timer.reset().await?;
        self.stop_polling();
        self.view_tx.send_modify(|view| {
            view.set_running(false);
            view.set_current(0);
        });

        self.store.clear_all()?;
        let snapshot = self.store.snapshot();
        self.view_tx.send_modify(|view| view.apply_snapshot(&snapshot));

        info!("Popup reset the timer and cleared history");
        Ok(self.view())
    }

    /// Delete a history row and take its duration off the total
    pub async fn delete_record(&self, timestamp: i64) -> Result<PopupView, PopupError> {
        let snapshot = self.store.delete_record(timestamp)?;
        self.view_tx.send_modify(|view| view.apply_snapshot(&snapshot));
        Ok(self.view())
    }

    /// Stop refreshing the display. The timer keeps running.
    pub fn close(&self) {
        self.stop_polling();
        debug!("Popup closed");
    }

    /// Check if the display poller is active
    pub fn is_polling(&self) -> bool {
        match self.poller.lock() {
            Ok(poller) => poller.as_ref().is_some_and(|handle| !handle.is_finished()),
            Err(_) => false,
        }
    }

    fn start_polling(&self) {
        let handle = tokio::spawn(ui_poll_task(
            self.timer.clone(),
            Arc::clone(&self.view_tx),
            self.poll_interval,
        ));

        if let Ok(mut poller) = self.poller.lock() {
            if let Some(previous) = poller.replace(handle) {
                previous.abort();
            }
        }
    }

    fn stop_polling(&self) {
        if let Ok(mut poller) = self.poller.lock() {
            if let Some(handle) = poller.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for PopupController {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::spawn_timer_service,
        state::TimerEngine,
        store::MemoryStore,
        utils::ManualClock,
    };

    const START: i64 = 1_760_800_000_000;

    fn popup() -> (PopupController, Arc<SessionStore>, ManualClock) {
        let clock = ManualClock::new(START);
        let engine = TimerEngine::new(Arc::new(clock.clone()));
        let (timer, _badge) = spawn_timer_service(engine, Duration::from_secs(1));
        let store = Arc::new(SessionStore::new(
            Arc::new(MemoryStore::new()),
            Arc::new(clock.clone()),
        ));
        let popup = PopupController::new(timer, Arc::clone(&store), Duration::from_millis(200));
        (popup, store, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn session_of_125_seconds_is_recorded() {
        let (popup, store, clock) = popup();
        popup.open().await.unwrap();
        popup.start().await.unwrap();

        clock.advance_secs(125);
        let view = popup.stop().await.unwrap();

        assert_eq!(store.get_total(), 125);
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, 125);
        assert_eq!(view.total, "Total: 2m 5s");
        assert_eq!(view.current, "0s");
        assert_eq!(view.button, "Start");
        assert!(!popup.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_a_run_keeps_history() {
        let (popup, store, clock) = popup();
        for secs in 1..=5 {
            popup.start().await.unwrap();
            clock.advance_secs(secs);
            popup.stop().await.unwrap();
        }
        let before = store.snapshot();

        popup.stop().await.unwrap();
        popup.stop().await.unwrap();

        // a stop issued by another client does not end a popup session either
        popup.start().await.unwrap();
        clock.advance_secs(9);
        popup.timer.stop().await.unwrap();
        let view = popup.stop().await.unwrap();

        assert_eq!(store.snapshot(), before);
        let durations: Vec<u64> = store.records().iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![5, 4, 3, 2, 1]);
        assert_eq!(store.get_total(), 15);
        assert_eq!(view.total, "Total: 15s");
        assert!(!view.is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_run_is_still_a_session() {
        let (popup, store, clock) = popup();
        popup.start().await.unwrap();
        clock.advance_millis(400);
        popup.stop().await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn two_sessions_accumulate_newest_first() {
        let (popup, store, clock) = popup();
        popup.start().await.unwrap();
        clock.advance_secs(60);
        popup.stop().await.unwrap();

        clock.advance_secs(5);
        popup.toggle().await.unwrap();
        clock.advance_secs(40);
        let view = popup.toggle().await.unwrap();

        assert_eq!(store.get_total(), 100);
        let durations: Vec<u64> = store.records().iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![40, 60]);
        assert_eq!(view.records[0].duration, "40s");
    }

    #[tokio::test(start_paused = true)]
    async fn polling_updates_current_time() {
        let (popup, _, clock) = popup();
        popup.start().await.unwrap();
        assert!(popup.is_polling());

        clock.advance_secs(75);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(popup.view().current, "1m 15s");
        assert!(popup.view().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn reopening_resumes_a_running_timer() {
        let (popup, store, clock) = popup();
        popup.start().await.unwrap();
        popup.close();
        assert!(!popup.is_polling());

        clock.advance_secs(30);
        let reopened = PopupController::new(popup.timer.clone(), store, Duration::from_millis(200));
        let view = reopened.open().await.unwrap();

        assert!(view.is_running);
        assert_eq!(view.button, "Stop");
        assert_eq!(view.current, "30s");
        assert!(reopened.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_timer_and_history() {
        let (popup, store, clock) = popup();
        popup.start().await.unwrap();
        clock.advance_secs(10);
        popup.stop().await.unwrap();
        popup.start().await.unwrap();
        clock.advance_secs(10);

        let view = popup.reset().await.unwrap();

        assert_eq!(store.get_total(), 0);
        assert!(store.records().is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(crate::controller::EMPTY_HISTORY));
        assert!(!view.is_running);
        let report = popup.timer.get_time().await.unwrap();
        assert_eq!(report.elapsed_seconds, 0);
        assert!(!report.is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_updates_view_and_total() {
        let (popup, store, clock) = popup();
        popup.start().await.unwrap();
        clock.advance_secs(90);
        popup.stop().await.unwrap();

        let timestamp = store.records()[0].timestamp;
        popup.delete_record(timestamp + 1).await.unwrap();
        assert_eq!(store.get_total(), 90);

        let view = popup.delete_record(timestamp).await.unwrap();
        assert_eq!(store.get_total(), 0);
        assert!(view.records.is_empty());
        assert_eq!(view.total, "Total: 0s");
    }

    #[tokio::test(start_paused = true)]
    async fn polling_ends_when_timer_stops_elsewhere() {
        let (popup, _, clock) = popup();
        popup.start().await.unwrap();
        clock.advance_secs(5);

        popup.timer.stop().await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(!popup.is_polling());
        let view = popup.view();
        assert!(!view.is_running);
        assert_eq!(view.current, "0s");
    }
}
