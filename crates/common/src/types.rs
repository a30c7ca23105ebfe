//! Core data types for the probing engine
//!
//! Absent data is typed (`Option`, `ResponseStatus`) throughout the engine.
//! The legacy sentinel strings (`"null"`, `"unreachable"`) only appear when a
//! result is rendered for stdout or persistence, see the `*_field` helpers on
//! [`ProbeResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Rendered in place of any field that has no value.
pub const NULL_SENTINEL: &str = "null";

/// Rendered as the status of a probe whose request failed at transport level.
pub const UNREACHABLE_SENTINEL: &str = "unreachable";

/// Separator between multiple values of the same header.
pub const HEADER_VALUE_SEPARATOR: &str = "</br>";

/// Separator between distinct headers.
pub const HEADER_ENTRY_SEPARATOR: &str = ",";

/// User-Agent sent with every probe unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:15.0) Gecko/20100101 Firefox/15.0.1";

/// Application protocols a probe can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One probe unit: a domain on a port speaking a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeTarget {
    pub domain: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl ProbeTarget {
    #[inline]
    #[must_use]
    pub fn new(domain: impl Into<String>, port: u16, protocol: Protocol) -> Self {
        Self {
            domain: domain.into(),
            port,
            protocol,
        }
    }

    #[inline]
    #[must_use]
    pub fn http(domain: impl Into<String>, port: u16) -> Self {
        Self::new(domain, port, Protocol::Http)
    }

    #[inline]
    #[must_use]
    pub fn https(domain: impl Into<String>, port: u16) -> Self {
        Self::new(domain, port, Protocol::Https)
    }

    /// Request URL in the `protocol://domain:port` form.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.domain, self.port)
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.domain, self.port, self.protocol)
    }
}

/// Outcome of the HTTP exchange for a resolved target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// No request was issued.
    NotAttempted,
    /// The request failed before a response arrived (connect, TLS, timeout).
    Unreachable,
    /// A response arrived with this status code.
    Code(u16),
}

impl ResponseStatus {
    #[inline]
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            ResponseStatus::Code(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::NotAttempted => f.write_str(NULL_SENTINEL),
            ResponseStatus::Unreachable => f.write_str(UNREACHABLE_SENTINEL),
            ResponseStatus::Code(code) => write!(f, "{}", code),
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A response header with every value it was sent with, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub values: Vec<String>,
}

impl HeaderEntry {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

impl fmt::Display for HeaderEntry {
    // Values are not escaped; a separator inside a value is emitted as-is.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.values.join(HEADER_VALUE_SEPARATOR))
    }
}

/// Record produced for every target whose domain resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub domain: String,
    /// First address returned by the resolver.
    pub ip_address: IpAddr,
    pub port: u16,
    pub protocol: Protocol,
    pub status: ResponseStatus,
    /// `None` when no response object exists.
    pub headers: Option<Vec<HeaderEntry>>,
    /// `None` when there was no response or the body could not be read fully.
    pub body: Option<String>,
    /// Byte length of the raw body; zero whenever `body` is `None`.
    pub response_size: usize,
    pub probed_at: DateTime<Utc>,
}

impl ProbeResult {
    /// Fresh record for a resolved target; no request attempted yet.
    #[must_use]
    pub fn new(target: &ProbeTarget, ip_address: IpAddr) -> Self {
        Self {
            domain: target.domain.clone(),
            ip_address,
            port: target.port,
            protocol: target.protocol,
            status: ResponseStatus::NotAttempted,
            headers: None,
            body: None,
            response_size: 0,
            probed_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.status = status;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<HeaderEntry>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Attach a fully read body. Size and payload are always set together.
    #[must_use]
    pub fn with_body(mut self, raw: &[u8]) -> Self {
        self.body = Some(String::from_utf8_lossy(raw).into_owned());
        self.response_size = raw.len();
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        self.status.code().is_some()
    }

    /// The (domain, port, protocol) key results are persisted under.
    #[must_use]
    pub fn target(&self) -> ProbeTarget {
        ProbeTarget::new(self.domain.clone(), self.port, self.protocol)
    }

    #[must_use]
    pub fn status_field(&self) -> String {
        self.status.to_string()
    }

    #[must_use]
    pub fn headers_field(&self) -> String {
        match &self.headers {
            Some(headers) => headers
                .iter()
                .map(HeaderEntry::to_string)
                .collect::<Vec<_>>()
                .join(HEADER_ENTRY_SEPARATOR),
            None => NULL_SENTINEL.to_string(),
        }
    }

    #[must_use]
    pub fn body_field(&self) -> &str {
        self.body.as_deref().unwrap_or(NULL_SENTINEL)
    }
}

impl fmt::Display for ProbeResult {
    /// `domain,ip,port,protocol,status,headers,body,size`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.domain,
            self.ip_address,
            self.port,
            self.protocol,
            self.status,
            self.headers_field(),
            self.body_field(),
            self.response_size
        )
    }
}

/// A domain that failed DNS resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedMarker {
    pub domain: String,
}

impl UnresolvedMarker {
    #[inline]
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

impl fmt::Display for UnresolvedMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.domain)
    }
}

/// What a single prober invocation hands back to the engine.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Probed(ProbeResult),
    Unresolved(UnresolvedMarker),
}

/// Probe behaviour tuning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOptions {
    /// Whole-request timeout, body read included.
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
    /// Upper bound on probers doing network I/O at the same time.
    pub max_concurrency: usize,
    /// Capacity of each of the two result channels.
    pub channel_capacity: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            max_concurrency: 500,
            channel_capacity: 100,
        }
    }
}
