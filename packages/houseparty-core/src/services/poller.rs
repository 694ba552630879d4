//! Fixed-cadence background polling.
//!
//! A [`Poller`] drives a [`PollTask`] on a `tokio::time::interval`. Each tick
//! spawns the task's fetch instead of awaiting it, so a slow backend call
//! never delays the next tick. The loop and every spawned fetch observe the
//! same `CancellationToken`, which is a child of the owner's token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::runtime::{TaskSpawner, TokioSpawner};

/// One unit of periodic work.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    /// Component tag used in log lines.
    fn name(&self) -> &'static str;

    /// Performs one fetch.
    ///
    /// Implementations must check `cancel` after their remote call returns and
    /// drop the result if it has fired.
    async fn tick(&self, cancel: &CancellationToken);
}

/// `Idle --start--> Polling --stop--> Idle`.
pub struct Poller<T: PollTask> {
    task: Arc<T>,
    period: Duration,
    parent: CancellationToken,
    /// Token of the current polling run; `None` while idle.
    running: Mutex<Option<CancellationToken>>,
    spawner: TokioSpawner,
}

impl<T: PollTask> Poller<T> {
    /// Creates an idle poller. Cancelling `parent` stops it for good.
    pub fn new(
        task: Arc<T>,
        period: Duration,
        parent: CancellationToken,
        spawner: TokioSpawner,
    ) -> Self {
        Self {
            task,
            period,
            parent,
            running: Mutex::new(None),
            spawner,
        }
    }

    pub fn task(&self) -> &Arc<T> {
        &self.task
    }

    /// Starts polling. The first tick fires one period from now.
    ///
    /// No-op if already polling or if the parent token has been cancelled.
    pub fn start(&self) {
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|t| !t.is_cancelled()) {
            return;
        }
        if self.parent.is_cancelled() {
            log::debug!("[{}] Not starting, owner already cancelled", self.task.name());
            return;
        }

        let token = self.parent.child_token();
        *running = Some(token.clone());
        drop(running);

        let task = Arc::clone(&self.task);
        let period = self.period;
        let spawner = self.spawner.clone();

        self.spawner.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            log::debug!("[{}] Polling every {:?}", task.name(), period);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let task = Arc::clone(&task);
                        let token = token.clone();
                        spawner.spawn(async move {
                            task.tick(&token).await;
                        });
                    }
                }
            }

            log::debug!("[{}] Stopped", task.name());
        });
    }

    /// Stops polling. In-flight fetches see the cancelled token.
    pub fn stop(&self) {
        if let Some(token) = self.running.lock().take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }
}

impl<T: PollTask> Drop for Poller<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTask {
        ticks: AtomicUsize,
    }

    #[async_trait]
    impl PollTask for CountingTask {
        fn name(&self) -> &'static str {
            "CountingTask"
        }

        async fn tick(&self, _cancel: &CancellationToken) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Fetch that takes longer than the poll period.
    struct SlowTask {
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    #[async_trait]
    impl PollTask for SlowTask {
        fn name(&self) -> &'static str {
            "SlowTask"
        }

        async fn tick(&self, cancel: &CancellationToken) {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2500)).await;
            if !cancel.is_cancelled() {
                self.completed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn counting_poller(parent: CancellationToken) -> Poller<CountingTask> {
        Poller::new(
            Arc::new(CountingTask {
                ticks: AtomicUsize::new(0),
            }),
            Duration::from_secs(1),
            parent,
            TokioSpawner::current(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let poller = counting_poller(CancellationToken::new());
        poller.start();
        assert!(poller.is_running());

        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(poller.task().ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_polling() {
        let poller = counting_poller(CancellationToken::new());
        poller.start();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        poller.stop();
        assert!(!poller.is_running());
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(poller.task().ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_and_blocks_restart() {
        let parent = CancellationToken::new();
        let poller = counting_poller(parent.clone());
        poller.start();

        parent.cancel();
        assert!(!poller.is_running());

        poller.start();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(poller.task().ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_does_not_double_tick() {
        let poller = counting_poller(CancellationToken::new());
        poller.start();
        poller.start();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(poller.task().ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetches_overlap_and_are_discarded_after_stop() {
        let poller = Poller::new(
            Arc::new(SlowTask {
                started: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }),
            Duration::from_secs(1),
            CancellationToken::new(),
            TokioSpawner::current(),
        );
        poller.start();

        // Ticks at 1s, 2s, 3s start despite each fetch taking 2.5s.
        tokio::time::sleep(Duration::from_millis(3600)).await;
        assert_eq!(poller.task().started.load(Ordering::SeqCst), 3);
        assert_eq!(poller.task().completed.load(Ordering::SeqCst), 1);

        poller.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(poller.task().started.load(Ordering::SeqCst), 3);
        assert_eq!(poller.task().completed.load(Ordering::SeqCst), 1);
    }
}
