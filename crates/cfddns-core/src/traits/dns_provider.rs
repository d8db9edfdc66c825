// # DNS Provider Trait
//
// Defines the interface for overwriting a DNS record via a provider API.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Result of a confirmed record update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Provider-side identifier of the record that was written
    pub record_id: String,
    /// Record content before the write, as the provider reported it
    pub previous_content: String,
    /// The address now held by the record
    pub new_ip: Ipv4Addr,
    /// True if the write was only logged, not submitted
    pub dry_run: bool,
}

/// Trait for DNS provider implementations
///
/// One call performs the whole lookup-and-overwrite sequence for one record.
/// Any failing step aborts the call with an error; providers do not retry,
/// roll back, or create missing records. Scheduling and change detection
/// belong to [`DdnsEngine`](crate::DdnsEngine).
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Overwrite the content of `record_name` with `new_ip`
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: The provider confirmed the write
    /// - `Err(Error)`: Authentication, lookup, network or rejected write
    async fn update_record(
        &self,
        record_name: &str,
        new_ip: Ipv4Addr,
    ) -> Result<UpdateOutcome, crate::Error>;

    /// Display name, logged as `Updating <name>` before each write
    fn provider_name(&self) -> &'static str;
}
