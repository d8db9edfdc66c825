// # Cloudflare DNS Provider
//
// Overwrites the content of one existing DNS record through the Cloudflare
// API v4, authenticating with a global API key and account email.
//
// ## Sequence (one `update_record` call)
//
// 1. Resolve the configured zone name to a zone ID
// 2. List every record in the zone (all pages)
// 3. Find the record whose name equals the target
// 4. PUT the record back with the new content
//
// Any failing step aborts the call. No retry, no rollback, no record
// creation; the engine's next tick is the retry.
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Empty key or email is rejected at construction
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=..&per_page=..`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use cfddns_core::config::UpdaterConfig;
use cfddns_core::traits::{DnsProvider, UpdateOutcome};
use cfddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing records
const RECORDS_PER_PAGE: u32 = 100;

/// Provider name used in errors and logs
const PROVIDER: &str = "Cloudflare";

/// Knobs that do not belong in [`UpdaterConfig`]
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Perform the lookups but only log the write
    pub dry_run: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// API root, overridable for tests
    pub base_url: String,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            timeout: DEFAULT_HTTP_TIMEOUT,
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Global API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Account email paired with the key
    email: String,

    /// Zone name in which records are looked up
    zone_name: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// API root without trailing slash
    base_url: String,

    /// Dry-run mode: if true, perform GET requests but skip the PUT
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .field("zone_name", &self.zone_name)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if the API key or email is empty
    /// - [`Error::Config`] if the HTTP client cannot be built
    pub fn new(config: &UpdaterConfig, options: ProviderOptions) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::auth("Cloudflare API key cannot be empty"));
        }
        if config.email.is_empty() {
            return Err(Error::auth("Cloudflare account email cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            email: config.email.clone(),
            zone_name: config.target_zone.clone(),
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            dry_run: options.dry_run,
        })
    }

    /// Create a provider in live mode against the public API
    pub fn new_live(config: &UpdaterConfig) -> Result<Self> {
        Self::new(config, ProviderOptions::default())
    }

    /// Create a provider in dry-run mode against the public API
    pub fn new_dry_run(config: &UpdaterConfig) -> Result<Self> {
        Self::new(
            config,
            ProviderOptions {
                dry_run: true,
                ..ProviderOptions::default()
            },
        )
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve a zone name to its zone ID
    ///
    /// The API filters by name, but only an exact match is accepted.
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    pub async fn zone_id_by_name(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for: {}", zone_name);

        let url = format!("{}/zones", self.base_url);
        let request = self.request(Method::GET, &url).query(&[("name", zone_name)]);
        let envelope: Envelope<Vec<Zone>> = self.send(request, "Zone lookup").await?;

        let zone = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .find(|zone| zone.name == zone_name)
            .ok_or_else(|| Error::zone_not_found(zone_name))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// List every DNS record in a zone, following pagination
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?page=1&per_page=100
    /// ```
    pub async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let request = self.request(Method::GET, &url).query(&[
                ("page", page.to_string()),
                ("per_page", RECORDS_PER_PAGE.to_string()),
            ]);
            let envelope: Envelope<Vec<DnsRecord>> = self.send(request, "Record listing").await?;

            let batch = envelope.result.unwrap_or_default();
            let batch_len = batch.len();
            records.extend(batch);

            let total_pages = envelope.result_info.map(|info| info.total_pages).unwrap_or(1);
            if batch_len == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!("Zone {} holds {} record(s)", zone_id, records.len());
        Ok(records)
    }

    /// Write `record` back with `new_ip` as its content
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": false }
    /// ```
    async fn put_record(&self, zone_id: &str, record: &DnsRecord, new_ip: Ipv4Addr) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record.id);
        let body = UpdateRecordRequest::overwrite(record, new_ip);

        let response = self
            .request(Method::PUT, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 | 429 | 500..=599 => status_error(status, "Record update", &error_text),
                _ => Error::update_rejected(format!("{} - {}", status, error_text)),
            });
        }

        let envelope: Envelope<serde_json::Value> = decode(response).await?;

        if !envelope.success {
            return Err(Error::update_rejected(describe(&envelope.errors)));
        }

        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Auth-Key", &self.api_key)
            .header("X-Auth-Email", &self.email)
            .header("Content-Type", "application/json")
    }

    /// Send a read request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Envelope<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, context, &error_text));
        }

        let envelope: Envelope<T> = decode(response).await?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!("{} failed: {}", context, describe(&envelope.errors)),
            ));
        }

        Ok(envelope)
    }
}

/// Read a success body and decode the envelope
///
/// A body that is not the expected JSON surfaces as [`Error::Json`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
    let body = response
        .text()
        .await
        .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

    Ok(serde_json::from_str(&body)?)
}

/// Map a non-success status to an error
fn status_error(status: StatusCode, context: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API key or email, or insufficient permissions. Status: {}",
            status
        )),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::http(format!(
            "Cloudflare server error (transient): {} - {}",
            status, body
        )),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", context, status, body)),
    }
}

/// Render API error messages as `code: message, ...`
fn describe(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details returned".to_string();
    }

    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn update_record(&self, record_name: &str, new_ip: Ipv4Addr) -> Result<UpdateOutcome> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} [mode: {}]",
            record_name,
            new_ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let zone_id = self.zone_id_by_name(&self.zone_name).await?;
        let records = self.list_records(&zone_id).await?;

        let record = records
            .iter()
            .find(|record| record.name == record_name)
            .ok_or_else(|| {
                Error::record_not_found(
                    record_name,
                    records.iter().map(|record| record.name.clone()).collect(),
                )
            })?;

        if record.record_type != "A" {
            tracing::warn!(
                "Record {} is of type {}, overwriting its content anyway",
                record_name,
                record.record_type
            );
        }

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT /zones/{}/dns_records/{} with payload: {}",
                zone_id,
                record.id,
                serde_json::json!(UpdateRecordRequest::overwrite(record, new_ip))
            );
        } else {
            self.put_record(&zone_id, record, new_ip).await?;
            tracing::info!(
                "DNS record updated successfully: {} -> {} (was: {})",
                record_name,
                new_ip,
                record.content
            );
        }

        Ok(UpdateOutcome {
            record_id: record.id.clone(),
            previous_content: record.content.clone(),
            new_ip,
            dry_run: self.dry_run,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// Cloudflare API types

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default = "default_total_pages")]
    total_pages: u32,
}

fn default_total_pages() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
    name: String,
}

/// A DNS record as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    /// Opaque record ID
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type ("A", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content; an address for A records
    pub content: String,
    /// TTL in seconds, 1 meaning "automatic"
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// Whether traffic is proxied through Cloudflare
    #[serde(default)]
    pub proxied: bool,
}

fn default_ttl() -> u32 {
    1
}

#[derive(Debug, Serialize)]
struct UpdateRecordRequest {
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
    ttl: u32,
    proxied: bool,
}

impl UpdateRecordRequest {
    /// Keep everything from `record` except the content
    fn overwrite(record: &DnsRecord, new_ip: Ipv4Addr) -> Self {
        Self {
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            content: new_ip.to_string(),
            ttl: record.ttl,
            proxied: record.proxied,
        }
    }
}
