// # HTTP IP Source
//
// Discovers the caller's public IPv4 address by asking an IP-echo service
// (by default https://api.ipify.org), which answers with the address as the
// entire plain-text response body.
//
// One GET per call; no caching and no retry. The engine calls `current()`
// once per tick, and the next tick is the retry.

use async_trait::async_trait;
use cfddns_core::config::IpSourceConfig;
use cfddns_core::traits::IpSource;
use cfddns_core::{Error, Result};
use std::net::Ipv4Addr;

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: &IpSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }

    /// URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching current IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!("{} returned {}", self.url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        parse_address(&body)
    }
}

/// Parse an IP-echo response body as an IPv4 address
///
/// Surrounding whitespace (a trailing newline, typically) is ignored.
pub fn parse_address(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();
    text.parse()
        .map_err(|_| Error::invalid_address(text.to_string()))
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.fetch_ip().await
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
