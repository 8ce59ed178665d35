//! Timer service: the single owner of the stopwatch engine.
//!
//! The engine lives inside one task; everything else talks to it through a
//! cloneable [`TimerHandle`] that sends commands over an mpsc channel and
//! awaits the reply on a oneshot. No lock is ever taken on timer state.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use super::protocol::{Command, Response, StopReport};
use crate::{
    error::TimerError,
    state::{Badge, TimeReport, TimerEngine},
    tasks::badge_refresh_task,
};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
pub(crate) enum Request {
    Command {
        command: Command,
        reply: oneshot::Sender<Option<Response>>,
    },
    /// Stop and reply with the run length, `None` when nothing was running
    StopRun {
        reply: oneshot::Sender<Option<u64>>,
    },
    /// Repaint the badge for run `generation`; replies whether that run is live
    RefreshBadge {
        generation: u64,
        reply: oneshot::Sender<bool>,
    },
}

/// Sending side of the command channel
#[derive(Debug, Clone)]
pub struct TimerHandle {
    tx: mpsc::Sender<Request>,
}

/// Handle that does not keep the timer service alive
#[derive(Debug, Clone)]
pub struct WeakTimerHandle {
    tx: mpsc::WeakSender<Request>,
}

impl WeakTimerHandle {
    pub fn upgrade(&self) -> Option<TimerHandle> {
        self.tx.upgrade().map(|tx| TimerHandle { tx })
    }
}

impl TimerHandle {
    /// Send a raw command and wait for its reply
    pub async fn send(&self, command: Command) -> Result<Option<Response>, TimerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Command { command, reply })
            .await
            .map_err(|_| TimerError::ServiceClosed)?;
        rx.await.map_err(|_| TimerError::ServiceClosed)
    }

    pub async fn start(&self) -> Result<(), TimerError> {
        self.send(Command::Start).await.map(|_| ())
    }

    /// Stop the timer, returning the seconds of the run that just ended
    pub async fn stop(&self) -> Result<u64, TimerError> {
        match self.send(Command::Stop).await? {
            Some(Response::Stopped(report)) => Ok(report.elapsed),
            _ => Ok(0),
        }
    }

    /// Stop the timer, returning `None` when no run was in progress
    pub async fn stop_run(&self) -> Result<Option<u64>, TimerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::StopRun { reply })
            .await
            .map_err(|_| TimerError::ServiceClosed)?;
        rx.await.map_err(|_| TimerError::ServiceClosed)
    }

    pub async fn reset(&self) -> Result<(), TimerError> {
        self.send(Command::Reset).await.map(|_| ())
    }

    pub async fn get_time(&self) -> Result<TimeReport, TimerError> {
        match self.send(Command::GetTime).await? {
            Some(Response::Time(report)) => Ok(report),
            _ => Ok(TimeReport { elapsed_seconds: 0, is_running: false }),
        }
    }

    pub(crate) async fn refresh_badge(&self, generation: u64) -> Result<bool, TimerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::RefreshBadge { generation, reply })
            .await
            .map_err(|_| TimerError::ServiceClosed)?;
        rx.await.map_err(|_| TimerError::ServiceClosed)
    }

    pub fn downgrade(&self) -> WeakTimerHandle {
        WeakTimerHandle {
            tx: self.tx.downgrade(),
        }
    }
}

/// Spawn the timer service task. Returns the command handle and the badge feed.
///
/// The task runs until every [`TimerHandle`] is dropped.
pub fn spawn_timer_service(
    engine: TimerEngine,
    badge_interval: Duration,
) -> (TimerHandle, watch::Receiver<Badge>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (badge_tx, badge_rx) = watch::channel(Badge::cleared());

    let service = TimerService {
        engine,
        badge_tx,
        badge_interval,
        weak: WeakTimerHandle { tx: tx.downgrade() },
    };
    tokio::spawn(service.run(rx));

    (TimerHandle { tx }, badge_rx)
}

struct TimerService {
    engine: TimerEngine,
    badge_tx: watch::Sender<Badge>,
    badge_interval: Duration,
    weak: WeakTimerHandle,
}

impl TimerService {
    async fn run(mut self, mut rx: mpsc::Receiver<Request>) {
        info!("Timer service started");

        while let Some(request) = rx.recv().await {
            match request {
                Request::Command { command, reply } => {
                    let response = self.handle(command);
                    // the caller may have stopped waiting
                    let _ = reply.send(response);
                }
                Request::StopRun { reply } => {
                    let elapsed = self.engine.stop_run();
                    self.badge_tx.send_replace(Badge::cleared());
                    let _ = reply.send(elapsed);
                }
                Request::RefreshBadge { generation, reply } => {
                    let live = self.engine.is_running() && self.engine.generation() == generation;
                    if live {
                        self.badge_tx
                            .send_replace(Badge::running(self.engine.current_time()));
                    }
                    let _ = reply.send(live);
                }
            }
        }

        info!("Timer service stopped, all handles dropped");
    }

    fn handle(&mut self, command: Command) -> Option<Response> {
        debug!("Timer command: {}", command.name());

        match command {
            Command::Start => {
                if self.engine.start() {
                    self.badge_tx
                        .send_replace(Badge::running(self.engine.current_time()));
                    tokio::spawn(badge_refresh_task(
                        self.weak.clone(),
                        self.engine.generation(),
                        self.badge_interval,
                    ));
                }
                None
            }
            Command::Stop => {
                let elapsed = self.engine.stop();
                self.badge_tx.send_replace(Badge::cleared());
                Some(Response::Stopped(StopReport { elapsed }))
            }
            Command::Reset => {
                self.engine.reset();
                self.badge_tx.send_replace(Badge::cleared());
                None
            }
            Command::GetTime => Some(Response::Time(self.engine.report())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::utils::ManualClock;

    fn spawn() -> (TimerHandle, watch::Receiver<Badge>, ManualClock) {
        let clock = ManualClock::new(1_760_800_000_000);
        let engine = TimerEngine::new(Arc::new(clock.clone()));
        let (handle, badge) = spawn_timer_service(engine, Duration::from_secs(1));
        (handle, badge, clock)
    }

    #[tokio::test]
    async fn start_stop_reports_delta() {
        let (timer, _, clock) = spawn();
        timer.start().await.unwrap();
        clock.advance_secs(125);

        assert_eq!(timer.stop().await.unwrap(), 125);
        assert_eq!(
            timer.get_time().await.unwrap(),
            TimeReport { elapsed_seconds: 125, is_running: false }
        );
    }

    #[tokio::test]
    async fn start_and_reset_have_no_reply() {
        let (timer, _, _) = spawn();
        assert_eq!(timer.send(Command::Start).await.unwrap(), None);
        assert_eq!(timer.send(Command::Reset).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stop_while_stopped_replies_zero() {
        let (timer, _, _) = spawn();
        assert_eq!(
            timer.send(Command::Stop).await.unwrap(),
            Some(Response::Stopped(StopReport { elapsed: 0 }))
        );
    }

    #[tokio::test]
    async fn stop_run_reports_whether_a_run_ended() {
        let (timer, badge, clock) = spawn();
        assert_eq!(timer.stop_run().await.unwrap(), None);

        timer.start().await.unwrap();
        clock.advance_secs(7);
        assert_eq!(timer.stop_run().await.unwrap(), Some(7));
        assert!(badge.borrow().is_cleared());
        assert_eq!(timer.stop_run().await.unwrap(), None);
    }

    #[tokio::test]
    async fn badge_follows_start_and_stop() {
        let (timer, badge, clock) = spawn();
        clock.advance_secs(3);
        timer.start().await.unwrap();
        assert_eq!(badge.borrow().text, "0s");

        clock.advance_secs(2);
        timer.stop().await.unwrap();
        assert!(badge.borrow().is_cleared());

        timer.start().await.unwrap();
        assert!(!badge.borrow().is_cleared());
        timer.reset().await.unwrap();
        assert!(badge.borrow().is_cleared());
    }

    #[tokio::test]
    async fn stale_generation_is_not_live() {
        let (timer, _, _) = spawn();
        timer.start().await.unwrap();
        assert!(timer.refresh_badge(1).await.unwrap());

        timer.stop().await.unwrap();
        assert!(!timer.refresh_badge(1).await.unwrap());

        timer.start().await.unwrap();
        assert!(!timer.refresh_badge(1).await.unwrap());
        assert!(timer.refresh_badge(2).await.unwrap());
    }

    #[tokio::test]
    async fn weak_handle_does_not_outlive_handles() {
        let (timer, _, _) = spawn();
        let weak = timer.downgrade();
        assert!(weak.upgrade().is_some());

        drop(timer);
        assert!(weak.upgrade().is_none());
    }
}
