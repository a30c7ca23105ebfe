//! Fan-out of prober tasks

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::channels::ResultSenders;
use crate::tracker::{TaskGuard, TaskTracker};
use triager_common::{PortTable, ProbeTarget, Prober};

/// Spawns one prober task per (domain, port, protocol) triple.
///
/// Dispatch never waits on a prober. The concurrency ceiling is enforced
/// inside each task, so every triple gets its own task immediately and at
/// most `max_concurrency` of them do network I/O at once.
pub struct Dispatcher {
    prober: Arc<dyn Prober>,
    ports: PortTable,
    limiter: Arc<Semaphore>,
    tracker: Arc<TaskTracker>,
    senders: ResultSenders,
}

impl Dispatcher {
    /// `max_concurrency == 0` means no ceiling.
    pub fn new(
        prober: Arc<dyn Prober>,
        ports: PortTable,
        max_concurrency: usize,
        tracker: Arc<TaskTracker>,
        senders: ResultSenders,
    ) -> Self {
        let permits = if max_concurrency == 0 {
            Semaphore::MAX_PERMITS
        } else {
            max_concurrency.min(Semaphore::MAX_PERMITS)
        };
        Self {
            prober,
            ports,
            limiter: Arc::new(Semaphore::new(permits)),
            tracker,
            senders,
        }
    }

    /// Spawn probers for every domain and return how many were spawned.
    pub fn dispatch<I>(&self, domains: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut spawned = 0;
        for domain in domains {
            let domain: String = domain.into();
            // Count the whole domain before any of its probers can finish
            let guards = self.tracker.reserve(self.ports.len());
            for (target, guard) in self.ports.targets_for(&domain).zip(guards) {
                self.spawn_probe(target, guard);
                spawned += 1;
            }
            trace!("Dispatched {} prober(s) for {}", self.ports.len(), domain);
        }

        triager_telemetry::record_dispatched(spawned);
        debug!("Dispatch complete: {} prober task(s)", spawned);
        spawned
    }

    fn spawn_probe(&self, target: ProbeTarget, guard: TaskGuard) {
        let prober = Arc::clone(&self.prober);
        let limiter = Arc::clone(&self.limiter);
        let senders = self.senders.clone();

        tokio::spawn(async move {
            let outcome = {
                let _permit = limiter.acquire().await.ok();
                prober.probe(&target).await
            };
            senders.deliver(outcome).await;
            // Released only after the send above has completed
            drop(guard);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::result_channels;
    use async_trait::async_trait;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use triager_common::{ProbeOutcome, ProbeResult, TriagerResult};

    /// Records the peak number of concurrent probes.
    #[derive(Default)]
    struct GaugeProber {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Prober for GaugeProber {
        async fn probe(&self, target: &ProbeTarget) -> TriagerResult<ProbeOutcome> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(ProbeOutcome::Probed(ProbeResult::new(
                target,
                IpAddr::V4(Ipv4Addr::LOCALHOST),
            )))
        }

        fn name(&self) -> &str {
            "gauge"
        }
    }

    #[tokio::test]
    async fn spawns_one_task_per_triple() {
        let (senders, mut receivers) = result_channels(64);
        let tracker = Arc::new(TaskTracker::new());
        let dispatcher = Dispatcher::new(
            Arc::new(GaugeProber::default()),
            PortTable::from_ports(&[80, 443, 8080]),
            0,
            Arc::clone(&tracker),
            senders,
        );

        let spawned = dispatcher.dispatch(vec!["a.example", "b.example"]);
        assert_eq!(spawned, 8);
        drop(dispatcher);

        let mut urls = Vec::new();
        while let Some(result) = receivers.results.recv().await {
            urls.push(result.target().url());
        }
        urls.sort();
        assert_eq!(urls.len(), 8);
        assert!(urls.contains(&"http://a.example:8080".to_string()));
        assert!(urls.contains(&"https://b.example:8080".to_string()));
        tracker.wait_idle().await;
    }

    #[tokio::test]
    async fn concurrency_ceiling_is_respected() {
        let prober = Arc::new(GaugeProber::default());
        let (senders, mut receivers) = result_channels(256);
        let tracker = Arc::new(TaskTracker::new());
        let dispatcher = Dispatcher::new(
            prober.clone(),
            PortTable::default(),
            4,
            Arc::clone(&tracker),
            senders,
        );

        let domains: Vec<String> = (0..50).map(|i| format!("host{}.example", i)).collect();
        assert_eq!(dispatcher.dispatch(domains), 100);
        drop(dispatcher);

        let mut received = 0;
        while receivers.results.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 100);
        assert!(prober.peak.load(Ordering::SeqCst) <= 4);
    }
}
