//! Task spawning abstraction for runtime independence.
//!
//! Pollers, detached backend calls and the host authentication check all run
//! as background tasks. They are spawned through [`TaskSpawner`] so an
//! embedding application can route them onto its own runtime.

use std::future::Future;
use std::time::Duration;

use tokio_util::task::TaskTracker;

/// Abstraction for spawning background tasks.
///
/// Tasks run independently of the caller. Cancellation is not the
/// spawner's concern; long-running tasks watch a `CancellationToken`.
pub trait TaskSpawner: Send + Sync {
    /// Spawns a future as a background task.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Tokio-based spawner, the default for every front-end.
///
/// Backend calls spawned with [`spawn_detached`](Self::spawn_detached) or
/// [`spawn_tracked`](Self::spawn_tracked) are tracked so
/// [`drain`](Self::drain) can let them finish before the runtime goes away.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
    detached: TaskTracker,
}

impl TokioSpawner {
    /// Creates a new `TokioSpawner` with the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            detached: TaskTracker::new(),
        }
    }

    /// Creates a new `TokioSpawner` using the current runtime's handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Spawns a task that [`drain`](Self::drain) waits for.
    pub fn spawn_tracked<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.detached.spawn_on(future, &self.handle);
    }

    /// Spawns a backend call whose result nobody waits for.
    ///
    /// Failures are logged at warn level under `action`.
    pub fn spawn_detached<F, E>(&self, action: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display,
    {
        self.spawn_tracked(async move {
            if let Err(e) = future.await {
                log::warn!("[Detached] {} failed: {}", action, e);
            }
        });
    }

    /// Waits up to `timeout` for tracked tasks still in flight.
    ///
    /// Returns `false` if some were still running when the timeout hit.
    /// Calls spawned afterwards are still tracked.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.detached.close();
        let drained = tokio::time::timeout(timeout, self.detached.wait())
            .await
            .is_ok();
        self.detached.reopen();
        if !drained {
            log::warn!(
                "[Detached] {} call(s) still running after {:?}",
                self.detached.len(),
                timeout
            );
        }
        drained
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn tokio_spawner_executes_task() {
        let spawner = TokioSpawner::current();
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = executed.clone();

        spawner.spawn(async move {
            executed_clone.store(true, Ordering::SeqCst);
        });

        // Give the task time to execute
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(executed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn detached_failures_do_not_propagate() {
        let spawner = TokioSpawner::current();
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();

        spawner.spawn_detached("Fails", async move {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("boom")
        });

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_detached_calls() {
        let spawner = TokioSpawner::current();
        let done = Arc::new(AtomicBool::new(false));
        let done_clone = done.clone();

        spawner.spawn_detached("Slow", async move {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            done_clone.store(true, Ordering::SeqCst);
            Ok::<(), String>(())
        });

        assert!(spawner.drain(Duration::from_secs(1)).await);
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn drain_gives_up_after_timeout() {
        let spawner = TokioSpawner::current();
        spawner.spawn_detached("Stuck", async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok::<(), String>(())
        });

        assert!(!spawner.drain(Duration::from_millis(100)).await);
    }
}
