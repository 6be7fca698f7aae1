//! Deferred sends tied to the process lifecycle

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Runs tasks after a delay unless shut down first
///
/// Tasks whose delay has not elapsed at shutdown are dropped, never run.
#[derive(Clone, Default)]
pub struct DeferredSends {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl DeferredSends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler cancelled together with `parent`
    pub fn with_parent(parent: &CancellationToken) -> Self {
        Self {
            tracker: TaskTracker::new(),
            cancel: parent.child_token(),
        }
    }

    /// Run `task` once `delay` has elapsed
    #[cfg(test)]
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule_with(delay, self.cancel.clone(), task);
    }

    /// Token cancelled at shutdown that can also be cancelled on its own
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Like [`schedule`](Self::schedule), but dropped once `cancel` fires
    pub fn schedule_with<F>(&self, delay: Duration, cancel: CancellationToken, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(delay_ms = %delay.as_millis(), "Deferred send cancelled");
                }
                () = tokio::time::sleep(delay) => task.await,
            }
        });
    }

    /// Tasks scheduled and not yet finished
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Drop tasks still waiting and wait for running ones to finish
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Wait for every scheduled task without cancelling anything
    #[cfg(test)]
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
