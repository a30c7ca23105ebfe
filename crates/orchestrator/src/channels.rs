//! Result channels between probers and the collector

use tokio::sync::mpsc;
use tracing::{error, warn};

use triager_common::{ProbeOutcome, ProbeResult, TriagerError, TriagerResult, UnresolvedMarker};

/// Producer half, cloned into every prober task.
///
/// The channels close once every clone has been dropped, which is how the
/// completion watcher closes them.
#[derive(Debug, Clone)]
pub struct ResultSenders {
    results: mpsc::Sender<ProbeResult>,
    unresolved: mpsc::Sender<UnresolvedMarker>,
    fatal: mpsc::UnboundedSender<TriagerError>,
}

/// Consumer half, owned by the collector.
#[derive(Debug)]
pub struct ResultReceivers {
    pub results: mpsc::Receiver<ProbeResult>,
    pub unresolved: mpsc::Receiver<UnresolvedMarker>,
    pub fatal: mpsc::UnboundedReceiver<TriagerError>,
}

/// Two bounded queues of `capacity` items each, plus an unbounded lane for
/// fatal errors. A full queue blocks the sending prober.
pub fn result_channels(capacity: usize) -> (ResultSenders, ResultReceivers) {
    let capacity = capacity.max(1);
    let (results_tx, results_rx) = mpsc::channel(capacity);
    let (unresolved_tx, unresolved_rx) = mpsc::channel(capacity);
    let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
    (
        ResultSenders {
            results: results_tx,
            unresolved: unresolved_tx,
            fatal: fatal_tx,
        },
        ResultReceivers {
            results: results_rx,
            unresolved: unresolved_rx,
            fatal: fatal_rx,
        },
    )
}

impl ResultSenders {
    /// Route one prober outcome to its channel.
    pub async fn deliver(&self, outcome: TriagerResult<ProbeOutcome>) {
        match outcome {
            Ok(ProbeOutcome::Probed(result)) => {
                if self.results.send(result).await.is_err() {
                    warn!("Collector stopped before a probe result could be delivered");
                }
            }
            Ok(ProbeOutcome::Unresolved(marker)) => {
                if self.unresolved.send(marker).await.is_err() {
                    warn!("Collector stopped before an unresolved marker could be delivered");
                }
            }
            Err(e) => {
                error!("Fatal probe error: {}", e);
                let _ = self.fatal.send(e);
            }
        }
    }
}
