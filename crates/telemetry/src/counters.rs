//! Run counters exposed through the `metrics` facade
//!
//! Nothing is exported unless the embedding binary installs a recorder;
//! without one every call is a no-op.

use metrics::{counter, describe_counter};

/// Final classification of one prober task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reachable,
    Unreachable,
    Unresolved,
}

impl Outcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Reachable => "reachable",
            Outcome::Unreachable => "unreachable",
            Outcome::Unresolved => "unresolved",
        }
    }
}

pub fn describe_metrics() {
    describe_counter!(
        "triager_probes_dispatched_total",
        "Prober tasks spawned by the dispatcher"
    );
    describe_counter!(
        "triager_probes_completed_total",
        "Prober tasks whose outcome reached the collector"
    );
    describe_counter!(
        "triager_persistence_errors_total",
        "Result upserts rejected by the store"
    );
}

pub fn record_dispatched(count: usize) {
    counter!("triager_probes_dispatched_total").increment(count as u64);
}

pub fn record_completed(outcome: Outcome) {
    counter!("triager_probes_completed_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_persistence_error() {
    counter!("triager_persistence_errors_total").increment(1);
}
