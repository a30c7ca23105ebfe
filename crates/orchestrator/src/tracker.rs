//! Outstanding-task counter with an async wait-for-zero

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counts dispatched prober tasks that have not finished yet.
///
/// Increments happen through [`TaskTracker::reserve`], which hands out one
/// [`TaskGuard`] per reserved slot; dropping a guard is the only way to
/// decrement. A task must drop its guard after its final channel send.
#[derive(Debug, Default)]
pub struct TaskTracker {
    outstanding: AtomicUsize,
    idle: Notify,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `count` slots up front and return their guards.
    pub fn reserve(self: &Arc<Self>, count: usize) -> Vec<TaskGuard> {
        self.outstanding.fetch_add(count, Ordering::AcqRel);
        (0..count)
            .map(|_| TaskGuard {
                tracker: Arc::clone(self),
            })
            .collect()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Resolve once the counter is zero.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent final decrement is not missed
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish_one(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "task tracker underflow");
        if previous == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// One reserved slot of a [`TaskTracker`]; released on drop.
#[derive(Debug)]
pub struct TaskGuard {
    tracker: Arc<TaskTracker>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.finish_one();
    }
}
