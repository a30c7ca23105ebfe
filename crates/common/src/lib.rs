//! Triager Common - Shared types and traits
//!
//! This crate provides the data model, error type, and component traits used
//! across the triager workspace:
//! - probe targets, results and unresolved markers
//! - the (port, protocol) table that drives fan-out
//! - seams for resolvers, probers, result stores and unresolved sinks

pub mod error;
pub mod ports;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{TriagerError, TriagerResult};
pub use ports::{PortTable, DEFAULT_PORTS};
pub use traits::{DomainResolver, Prober, ResultStore, UnresolvedSink};
pub use types::{
    HeaderEntry, ProbeOptions, ProbeOutcome, ProbeResult, ProbeTarget, Protocol, ResponseStatus,
    UnresolvedMarker, DEFAULT_USER_AGENT, NULL_SENTINEL, UNREACHABLE_SENTINEL,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
