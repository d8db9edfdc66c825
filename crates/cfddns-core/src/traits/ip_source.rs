// # IP Source Trait
//
// Defines the interface for discovering the caller's public address.
//
// ## Implementations
//
// - HTTP IP-echo service: `cfddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> cfddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.current().await?;
//     println!("public address: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// A source answers one question per call: what is the caller's public
/// IPv4 address right now. It keeps no history; change detection belongs to
/// [`DdnsEngine`](crate::DdnsEngine).
///
/// # Errors
///
/// - [`Error::Network`](crate::Error::Network) when the lookup could not be performed
/// - [`Error::InvalidAddress`](crate::Error::InvalidAddress) when the answer is not an IPv4 address
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public IPv4 address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Short name for logging
    fn source_name(&self) -> &'static str {
        "ip-source"
    }
}
