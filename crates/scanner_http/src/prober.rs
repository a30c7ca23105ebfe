// crates/scanner_http/src/prober.rs
//! HTTP(S) prober implementation

use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::headers::collect_headers;
use triager_common::{
    DomainResolver, ProbeOptions, ProbeOutcome, ProbeResult, ProbeTarget, Prober, ResponseStatus,
    TriagerError, TriagerResult, UnresolvedMarker,
};

/// Probes one target with a single GET request. No retries.
pub struct HttpProber {
    client: Client,
    resolver: Arc<dyn DomainResolver>,
    user_agent: HeaderValue,
}

impl HttpProber {
    /// Build the shared HTTP client. The timeout covers the whole exchange,
    /// body read included.
    pub fn new(resolver: Arc<dyn DomainResolver>, options: &ProbeOptions) -> TriagerResult<Self> {
        let user_agent = HeaderValue::from_str(&options.user_agent)
            .map_err(|e| TriagerError::Config(format!("invalid user agent: {}", e)))?;

        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| TriagerError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            resolver,
            user_agent,
        })
    }

    /// Issue the request and fold every transport failure into the record.
    async fn fetch(&self, url: Url, mut result: ProbeResult) -> ProbeResult {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Request failed: {}", e);
                return result.with_status(ResponseStatus::Unreachable);
            }
        };

        result = result
            .with_status(ResponseStatus::Code(response.status().as_u16()))
            .with_headers(collect_headers(response.headers()));

        // A truncated or timed-out body leaves the body absent; the status stands
        match response.bytes().await {
            Ok(body) => result.with_body(&body),
            Err(e) => {
                debug!("Body read failed: {}", e);
                result
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    #[instrument(skip_all, fields(target = %target))]
    async fn probe(&self, target: &ProbeTarget) -> TriagerResult<ProbeOutcome> {
        let ips = match self.resolver.resolve(&target.domain).await {
            Ok(ips) => ips,
            Err(e) => {
                debug!("Unresolved: {}", e);
                return Ok(ProbeOutcome::Unresolved(UnresolvedMarker::new(&target.domain)));
            }
        };
        let Some(ip) = ips.first().copied() else {
            return Ok(ProbeOutcome::Unresolved(UnresolvedMarker::new(&target.domain)));
        };

        let raw_url = target.url();
        let url = Url::parse(&raw_url).map_err(|e| TriagerError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let result = self.fetch(url, ProbeResult::new(target, ip)).await;
        debug!("Probe finished with status {}", result.status);
        Ok(ProbeOutcome::Probed(result))
    }

    fn name(&self) -> &str {
        "HTTP Prober"
    }
}
