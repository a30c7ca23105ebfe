//! Fan-in of probe results and unresolved markers

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error};

use crate::channels::ResultReceivers;
use crate::output::OutputFormat;
use crate::progress::{ProgressTracker, RunSummary};
use triager_common::{ProbeResult, ResultStore, TriagerResult, UnresolvedMarker, UnresolvedSink};
use triager_telemetry::Outcome;

/// Where collected items end up.
pub struct Sinks {
    pub store: Arc<dyn ResultStore>,
    pub unresolved: Box<dyn UnresolvedSink>,
    /// Receives one formatted row per probe result (stdout in the binary).
    pub rows: Box<dyn Write + Send>,
    pub format: OutputFormat,
}

/// Single consumer of both result channels.
///
/// Persistence and file errors are logged and counted; they never stop the
/// loop. Only a fatal error from a prober ends collection early.
pub struct Collector {
    sinks: Sinks,
    unresolved_domains: HashSet<String>,
    progress: ProgressTracker,
}

impl Collector {
    pub fn new(sinks: Sinks) -> Self {
        Self {
            sinks,
            unresolved_domains: HashSet::new(),
            progress: ProgressTracker::new(),
        }
    }

    /// Drain both channels until each is closed and empty.
    pub async fn run(mut self, mut receivers: ResultReceivers) -> TriagerResult<RunSummary> {
        let mut results_open = true;
        let mut unresolved_open = true;

        while results_open || unresolved_open {
            // Fatal lane first: it is filled before the other channels close
            tokio::select! {
                biased;

                Some(fatal) = receivers.fatal.recv() => {
                    self.finish();
                    return Err(fatal);
                }
                item = receivers.results.recv(), if results_open => match item {
                    Some(result) => self.handle_result(result).await,
                    None => {
                        debug!("Result channel drained");
                        results_open = false;
                    }
                },
                item = receivers.unresolved.recv(), if unresolved_open => match item {
                    Some(marker) => self.handle_unresolved(marker),
                    None => {
                        debug!("Unresolved channel drained");
                        unresolved_open = false;
                    }
                },
            }
        }

        self.finish();
        if let Ok(fatal) = receivers.fatal.try_recv() {
            return Err(fatal);
        }
        Ok(self.progress.summary(self.unresolved_domains.len()))
    }

    /// Domains that failed resolution so far, without duplicates.
    pub fn unresolved_domains(&self) -> &HashSet<String> {
        &self.unresolved_domains
    }

    async fn handle_result(&mut self, result: ProbeResult) {
        self.progress.record_result(&result);
        triager_telemetry::record_completed(if result.is_reachable() {
            Outcome::Reachable
        } else {
            Outcome::Unreachable
        });

        match self.sinks.format.format_row(&result) {
            Ok(row) => {
                if let Err(e) = writeln!(self.sinks.rows, "{}", row) {
                    error!("Error writing result row for {}: {}", result.target(), e);
                }
            }
            Err(e) => error!("Error formatting result row for {}: {}", result.target(), e),
        }

        if let Err(e) = self.sinks.store.upsert(&result).await {
            error!("Error inserting row into database: {}", e);
            self.progress.record_persistence_error();
            triager_telemetry::record_persistence_error();
        }
    }

    fn handle_unresolved(&mut self, marker: UnresolvedMarker) {
        self.progress.record_unresolved();
        triager_telemetry::record_completed(Outcome::Unresolved);

        if let Err(e) = self.sinks.unresolved.append(&marker.domain) {
            error!("Error writing unresolved domain {}: {}", marker.domain, e);
        }
        self.unresolved_domains.insert(marker.domain);
    }

    fn finish(&mut self) {
        if let Err(e) = self.sinks.rows.flush() {
            error!("Error flushing result rows: {}", e);
        }
        if let Err(e) = self.sinks.unresolved.flush() {
            error!("Error flushing unresolved domains: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::result_channels;
    use crate::testing::{RecordingStore, SharedBuf, VecSink};
    use std::net::{IpAddr, Ipv4Addr};
    use triager_common::{ProbeOutcome, ProbeTarget, ResponseStatus, TriagerError};

    fn result_for(domain: &str, status: ResponseStatus) -> ProbeResult {
        ProbeResult::new(&ProbeTarget::http(domain, 80), IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_status(status)
    }

    #[tokio::test]
    async fn drains_both_channels_until_closed() {
        let store = RecordingStore::default();
        let sink = VecSink::default();
        let rows = SharedBuf::default();
        let collector = Collector::new(Sinks {
            store: Arc::new(store.clone()),
            unresolved: Box::new(sink.clone()),
            rows: Box::new(rows.clone()),
            format: OutputFormat::Csv,
        });

        let (senders, receivers) = result_channels(2);
        let producer = tokio::spawn(async move {
            for i in 0..10 {
                senders
                    .deliver(Ok(ProbeOutcome::Probed(result_for(
                        &format!("h{}.example", i),
                        ResponseStatus::Code(200),
                    ))))
                    .await;
                senders
                    .deliver(Ok(ProbeOutcome::Unresolved(UnresolvedMarker::new("gone.invalid"))))
                    .await;
            }
        });

        let summary = collector.run(receivers).await.unwrap();
        producer.await.unwrap();

        assert_eq!(summary.reachable, 10);
        assert_eq!(summary.unresolved, 10);
        assert_eq!(summary.distinct_unresolved, 1);
        assert_eq!(store.len(), 10);
        assert_eq!(sink.lines().len(), 10);
        assert_eq!(rows.contents().lines().count(), 10);
    }

    #[tokio::test]
    async fn persistence_errors_do_not_stop_collection() {
        let sink = VecSink::default();
        let collector = Collector::new(Sinks {
            store: Arc::new(RecordingStore::failing()),
            unresolved: Box::new(sink.clone()),
            rows: Box::new(std::io::sink()),
            format: OutputFormat::Csv,
        });

        let (senders, receivers) = result_channels(8);
        senders
            .deliver(Ok(ProbeOutcome::Probed(result_for("a.example", ResponseStatus::Unreachable))))
            .await;
        senders
            .deliver(Ok(ProbeOutcome::Probed(result_for("b.example", ResponseStatus::Code(500)))))
            .await;
        senders
            .deliver(Ok(ProbeOutcome::Unresolved(UnresolvedMarker::new("c.invalid"))))
            .await;
        drop(senders);

        let summary = collector.run(receivers).await.unwrap();
        assert_eq!(summary.persistence_errors, 2);
        assert_eq!(summary.unreachable, 1);
        assert_eq!(summary.reachable, 1);
        assert_eq!(sink.lines(), vec!["c.invalid"]);
    }

    #[tokio::test]
    async fn fatal_error_ends_collection() {
        let collector = Collector::new(Sinks {
            store: Arc::new(RecordingStore::default()),
            unresolved: Box::new(VecSink::default()),
            rows: Box::new(std::io::sink()),
            format: OutputFormat::Csv,
        });

        let (senders, receivers) = result_channels(8);
        senders
            .deliver(Err(TriagerError::InvalidUrl {
                url: "http://bad host:80".into(),
                reason: "invalid domain character".into(),
            }))
            .await;

        // Senders stay open: the fatal lane alone must end the loop
        let err = collector.run(receivers).await.unwrap_err();
        assert!(err.is_fatal());
        drop(senders);
    }

    #[tokio::test]
    async fn fatal_error_wins_over_closed_channels() {
        for _ in 0..200 {
            let collector = Collector::new(Sinks {
                store: Arc::new(RecordingStore::default()),
                unresolved: Box::new(VecSink::default()),
                rows: Box::new(std::io::sink()),
                format: OutputFormat::Csv,
            });

            let (senders, receivers) = result_channels(8);
            senders
                .deliver(Err(TriagerError::InvalidUrl {
                    url: "http://bad host:80".into(),
                    reason: "invalid domain character".into(),
                }))
                .await;
            // All three lanes are closed by the time the collector polls them
            drop(senders);

            let err = collector.run(receivers).await.unwrap_err();
            assert!(matches!(err, TriagerError::InvalidUrl { .. }));
        }
    }

    #[tokio::test]
    async fn empty_run_finishes() {
        let collector = Collector::new(Sinks {
            store: Arc::new(RecordingStore::default()),
            unresolved: Box::new(VecSink::default()),
            rows: Box::new(std::io::sink()),
            format: OutputFormat::Json,
        });
        let (senders, receivers) = result_channels(1);
        drop(senders);
        let summary = collector.run(receivers).await.unwrap();
        assert_eq!(summary.received(), 0);
    }

    #[test]
    fn unresolved_set_deduplicates() {
        let mut collector = Collector::new(Sinks {
            store: Arc::new(RecordingStore::default()),
            unresolved: Box::new(VecSink::default()),
            rows: Box::new(std::io::sink()),
            format: OutputFormat::Csv,
        });
        collector.handle_unresolved(UnresolvedMarker::new("x.invalid"));
        collector.handle_unresolved(UnresolvedMarker::new("x.invalid"));
        assert_eq!(collector.unresolved_domains().len(), 1);
    }
}
