// crates/orchestrator/src/orchestrator.rs
//! Orchestrator - prober fan-out, completion tracking and result collection

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::channels::result_channels;
use crate::collector::{Collector, Sinks};
use crate::completion::CompletionSignal;
use crate::dispatcher::Dispatcher;
use crate::progress::RunSummary;
use crate::tracker::TaskTracker;
use triager_common::{PortTable, ProbeOptions, Prober, TriagerError, TriagerResult};

/// Drives one run: every domain is probed on every port/protocol pair of the
/// port table, and every outcome lands in the sinks before `run` returns.
pub struct Orchestrator {
    prober: Arc<dyn Prober>,
    ports: PortTable,
    options: ProbeOptions,
}

impl Orchestrator {
    pub fn new(prober: Arc<dyn Prober>, ports: PortTable, options: ProbeOptions) -> Self {
        Self {
            prober,
            ports,
            options,
        }
    }

    /// Probe all `domains` and collect the results.
    ///
    /// Returns once both result channels are closed and drained, or early
    /// with the first fatal prober error.
    pub async fn run<I>(&self, domains: I, sinks: Sinks) -> TriagerResult<RunSummary>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", id = %run_id, prober = self.prober.name());
        self.run_inner(domains, sinks).instrument(span).await
    }

    async fn run_inner<I>(&self, domains: I, sinks: Sinks) -> TriagerResult<RunSummary>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.ports.is_empty() {
            return Err(TriagerError::Config("no ports to probe".into()));
        }

        let started = Instant::now();
        let (senders, receivers) = result_channels(self.options.channel_capacity);
        let tracker = Arc::new(TaskTracker::new());

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.prober),
            self.ports.clone(),
            self.options.max_concurrency,
            Arc::clone(&tracker),
            senders.clone(),
        );
        let dispatched = dispatcher.dispatch(domains);
        drop(dispatcher);
        info!(
            "Dispatched {} prober(s) over {} port/protocol pair(s), concurrency {}",
            dispatched,
            self.ports.len(),
            self.options.max_concurrency
        );

        // Every spawn has been issued, so the counter can only go down from here
        let completion = CompletionSignal::spawn(tracker, senders);

        let mut summary = Collector::new(sinks).run(receivers).await?;
        completion.wait().await;

        summary.dispatched = dispatched;
        summary.elapsed = started.elapsed();
        if summary.received() != dispatched {
            warn!(
                "Received {} outcome(s) for {} dispatched prober(s)",
                summary.received(),
                dispatched
            );
        }
        summary.log();
        Ok(summary)
    }
}
