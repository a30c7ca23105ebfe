//! One-shot completion signal

use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

use crate::channels::ResultSenders;
use crate::tracker::TaskTracker;

/// Fires once every dispatched prober has finished.
///
/// The watcher holds the last dispatcher-side senders. It drops them once the
/// tracker reaches zero, and since each prober releases its guard only after
/// its send, both result channels close strictly after the final send.
pub struct CompletionSignal {
    done: oneshot::Receiver<()>,
}

impl CompletionSignal {
    /// Start the background watcher. Must be called after dispatch has
    /// issued every spawn.
    pub fn spawn(tracker: Arc<TaskTracker>, senders: ResultSenders) -> Self {
        let (tx, done) = oneshot::channel();
        tokio::spawn(async move {
            tracker.wait_idle().await;
            drop(senders);
            debug!("All probers finished, result channels closed");
            let _ = tx.send(());
        });
        Self { done }
    }

    /// Block until the watcher has fired.
    pub async fn wait(self) {
        let _ = self.done.await;
    }
}
