//! Popup display polling task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{controller::PopupView, services::TimerHandle};

/// Refresh the popup's live time from `getTime` every `period`.
///
/// Polling only reads timer state. The task ends by itself once the timer
/// reports it is no longer running; the popup aborts it on stop, reset or
/// close.
pub async fn ui_poll_task(
    timer: TimerHandle,
    view_tx: Arc<watch::Sender<PopupView>>,
    period: Duration,
) {
    debug!("Starting popup polling every {}ms", period.as_millis());

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let report = match timer.get_time().await {
            Ok(report) => report,
            Err(e) => {
                warn!("Popup polling failed: {}", e);
                break;
            }
        };

        if report.is_running {
            view_tx.send_modify(|view| view.set_current(report.elapsed_seconds));
        } else {
            debug!("Timer stopped elsewhere, popup polling ending");
            view_tx.send_modify(|view| {
                view.set_running(false);
                view.set_current(0);
            });
            break;
        }
    }
}
