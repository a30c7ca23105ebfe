//! Core traits for triager components
//!
//! Each stage of the pipeline sits behind one of these seams so the engine
//! can be driven by stub resolvers, probers and stores in tests.

use crate::error::TriagerResult;
use crate::types::{ProbeOutcome, ProbeResult, ProbeTarget};
use async_trait::async_trait;
use std::net::IpAddr;

/// Hostname to address resolution.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// Resolve `domain`. An error, or an empty list, means the domain is unresolved.
    async fn resolve(&self, domain: &str) -> TriagerResult<Vec<IpAddr>>;
}

/// A single probe of a single target.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target` once.
    ///
    /// Network failures are folded into the returned outcome. `Err` is
    /// reserved for fatal configuration errors such as an unbuildable URL.
    async fn probe(&self, target: &ProbeTarget) -> TriagerResult<ProbeOutcome>;

    /// Prober name/identifier
    fn name(&self) -> &str;
}

/// Persistence backend for probe results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert the result, or refresh the stored row for the same
    /// (domain, port, protocol).
    async fn upsert(&self, result: &ProbeResult) -> TriagerResult<()>;
}

/// Line-oriented sink for domains that failed resolution.
pub trait UnresolvedSink: Send {
    fn append(&mut self, domain: &str) -> TriagerResult<()>;

    fn flush(&mut self) -> TriagerResult<()> {
        Ok(())
    }
}
