//! Error types for triager
//!
//! Configuration errors (bad URL construction, bad settings) are fatal and
//! propagate to the top level. Everything network-related is absorbed into
//! the probe record by the prober itself.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriagerError {
    #[error("DNS resolution failed for {domain}: {reason}")]
    Resolution { domain: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl TriagerError {
    /// Errors that must terminate the whole run instead of being recorded
    /// against a single probe.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TriagerError::InvalidUrl { .. } | TriagerError::Config(_))
    }
}

/// Result type alias for triager operations
pub type TriagerResult<T> = Result<T, TriagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        let url = TriagerError::InvalidUrl {
            url: "http://bad host:80".to_string(),
            reason: "invalid domain character".to_string(),
        };
        assert!(url.is_fatal());
        assert!(TriagerError::Config("no ports".into()).is_fatal());
        assert!(!TriagerError::Network("reset".into()).is_fatal());
        assert!(!TriagerError::Storage("locked".into()).is_fatal());
    }

    #[test]
    fn io_errors_convert() {
        let err: TriagerError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, TriagerError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }
}
