//! HTTP(S) prober
//!
//! Resolves a domain, issues one GET against `protocol://domain:port` and
//! records status, headers and body.

mod headers;
mod prober;

pub use headers::{canonical_header_name, collect_headers};
pub use prober::HttpProber;
