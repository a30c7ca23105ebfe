//! Target Resolver - domain list loading and DNS resolution
//!
//! Provides the two inputs of a probe run:
//! - the domain list, read line by line from a text file
//! - a [`DomainResolver`] backed by trust-dns, honouring the system
//!   resolver configuration and hosts file

use async_trait::async_trait;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use triager_common::{DomainResolver, TriagerError, TriagerResult};

/// Async DNS resolver shared by every prober of a run.
pub struct TargetResolver {
    inner: TokioAsyncResolver,
}

impl TargetResolver {
    /// Build from `/etc/resolv.conf`, falling back to the library defaults
    /// when the system configuration cannot be read.
    pub fn from_system_conf() -> Self {
        let inner = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("System resolver configuration unavailable ({}), using defaults", e);
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { inner }
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::from_system_conf()
    }
}

#[async_trait]
impl DomainResolver for TargetResolver {
    async fn resolve(&self, domain: &str) -> TriagerResult<Vec<IpAddr>> {
        // Literal addresses need no lookup
        if let Ok(ip) = domain.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let lookup = self
            .inner
            .lookup_ip(domain)
            .await
            .map_err(|e| TriagerError::Resolution {
                domain: domain.to_string(),
                reason: e.to_string(),
            })?;

        let ips: Vec<IpAddr> = lookup.iter().collect();
        debug!("Resolved {} to {} address(es)", domain, ips.len());
        if ips.is_empty() {
            return Err(TriagerError::Resolution {
                domain: domain.to_string(),
                reason: "no addresses returned".to_string(),
            });
        }
        Ok(ips)
    }
}

/// Read the domain list from `path`, one domain per line.
pub fn read_domains<P: AsRef<Path>>(path: P) -> TriagerResult<Vec<String>> {
    let file = File::open(path.as_ref())?;
    parse_domains(BufReader::new(file))
}

/// Collect domains from a line reader. Lines are trimmed and blank lines
/// skipped; duplicates are kept.
pub fn parse_domains<R: BufRead>(reader: R) -> TriagerResult<Vec<String>> {
    let mut domains = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let domain = line.trim();
        if domain.is_empty() {
            continue;
        }
        domains.push(domain.to_string());
    }
    Ok(domains)
}
