//! Badge refresh background task

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::services::WeakTimerHandle;

/// Repaint the badge every `period` while run `generation` is live.
///
/// Each tick asks the timer service whether the run this task was spawned for
/// is still going. The task ends on the first tick after a stop, a reset or a
/// restart, or once the timer service itself is gone.
pub async fn badge_refresh_task(timer: WeakTimerHandle, generation: u64, period: Duration) {
    debug!("Starting badge refresh for run {}", generation);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately and the badge was painted on start
    interval.tick().await;

    loop {
        interval.tick().await;

        let Some(timer) = timer.upgrade() else {
            debug!("Timer service gone, badge refresh for run {} ending", generation);
            break;
        };

        match timer.refresh_badge(generation).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Run {} is over, badge refresh ending", generation);
                break;
            }
            Err(e) => {
                warn!("Badge refresh for run {} failed: {}", generation, e);
                break;
            }
        }
    }
}
