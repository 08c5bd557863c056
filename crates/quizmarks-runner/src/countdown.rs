//! Cancellable timers that feed events back into the driver loop.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::driver::QuizEvent;

/// A spawned task that is aborted when this guard is dropped or cancelled.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Send `event` once after `delay`.
    pub fn after(delay: Duration, sender: UnboundedSender<QuizEvent>, event: QuizEvent) -> Self {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(event);
        })
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Per-question countdown ticker.
pub struct Countdown;

impl Countdown {
    /// Send `Tick { epoch }` every `period`, starting one period from now,
    /// until the returned guard goes away or the receiver is closed.
    pub fn start(epoch: u64, period: Duration, sender: UnboundedSender<QuizEvent>) -> ScheduledTask {
        tracing::trace!(epoch, "countdown armed");
        ScheduledTask::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(QuizEvent::Tick { epoch }).is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let _guard = Countdown::start(7, Duration::from_secs(1), tx);

        for expected in 1..=3u64 {
            assert_eq!(rx.recv().await, Some(QuizEvent::Tick { epoch: 7 }));
            assert_eq!(start.elapsed(), Duration::from_secs(expected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_guard_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = Countdown::start(1, Duration::from_secs(1), tx.clone());
        assert_eq!(rx.recv().await, Some(QuizEvent::Tick { epoch: 1 }));
        guard.cancel();
        drop(tx);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_event_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let _task = ScheduledTask::after(Duration::from_millis(500), tx, QuizEvent::Advance);
        assert_eq!(rx.recv().await, Some(QuizEvent::Advance));
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_delay_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        ScheduledTask::after(Duration::from_millis(500), tx, QuizEvent::Advance).cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
