//! Progress tracking

use std::time::Duration;
use tracing::info;

use triager_common::ProbeResult;

/// Per-run counters, owned by the collector.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    reachable: usize,
    unreachable: usize,
    unresolved: usize,
    persistence_errors: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_result(&mut self, result: &ProbeResult) {
        if result.is_reachable() {
            self.reachable += 1;
        } else {
            self.unreachable += 1;
        }
    }

    pub fn record_unresolved(&mut self) {
        self.unresolved += 1;
    }

    pub fn record_persistence_error(&mut self) {
        self.persistence_errors += 1;
    }

    pub fn summary(&self, distinct_unresolved: usize) -> RunSummary {
        RunSummary {
            dispatched: 0,
            reachable: self.reachable,
            unreachable: self.unreachable,
            unresolved: self.unresolved,
            distinct_unresolved,
            persistence_errors: self.persistence_errors,
            elapsed: Duration::ZERO,
        }
    }
}

/// Totals of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub reachable: usize,
    pub unreachable: usize,
    /// Unresolved markers received, one per failed triple.
    pub unresolved: usize,
    pub distinct_unresolved: usize,
    pub persistence_errors: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Probe results received (reachable or not).
    pub fn results(&self) -> usize {
        self.reachable + self.unreachable
    }

    /// Items received over both channels.
    pub fn received(&self) -> usize {
        self.results() + self.unresolved
    }

    pub fn log(&self) {
        info!("Run Summary:");
        info!("  Probers dispatched: {}", self.dispatched);
        info!("  Reachable: {}", self.reachable);
        info!("  Unreachable: {}", self.unreachable);
        info!(
            "  Unresolved: {} ({} distinct domain(s))",
            self.unresolved, self.distinct_unresolved
        );
        info!("  Persistence errors: {}", self.persistence_errors);
        info!("  Elapsed: {:.1}s", self.elapsed.as_secs_f64());
        if self.dispatched > 0 {
            info!(
                "  Reachable rate: {:.1}%",
                (self.reachable as f64 / self.dispatched as f64) * 100.0
            );
        }
    }
}
