//! Core traits for the updater
//!
//! - [`IpSource`]: Discover the current public IPv4 address
//! - [`DnsProvider`]: Overwrite a DNS record via a provider API
//! - [`StateStore`]: Last-known address bookkeeping

pub mod dns_provider;
pub mod ip_source;
pub mod state_store;

pub use dns_provider::{DnsProvider, UpdateOutcome};
pub use ip_source::IpSource;
pub use state_store::{StateRecord, StateStore};
