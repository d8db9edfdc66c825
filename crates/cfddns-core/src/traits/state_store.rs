// # State Store Trait
//
// Tracks the last address confirmed written for each record so that an
// unchanged address does not cause a provider call.

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// State record for a DNS entry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    /// The last confirmed address
    pub last_ip: Ipv4Addr,
    /// When the provider confirmed it
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl StateRecord {
    pub(crate) fn new(last_ip: Ipv4Addr) -> Self {
        Self {
            last_ip,
            last_updated: chrono::Utc::now(),
        }
    }
}

/// Trait for state store implementations
///
/// Only the engine writes to the store, and only from inside a tick, so
/// implementations need interior mutability but never see concurrent writers.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the full state record
    async fn get_record(&self, record_name: &str) -> Result<Option<StateRecord>, crate::Error>;

    /// Get the last confirmed address for a record
    async fn get_last_ip(&self, record_name: &str) -> Result<Option<Ipv4Addr>, crate::Error> {
        Ok(self.get_record(record_name).await?.map(|record| record.last_ip))
    }

    /// Record a confirmed address
    async fn set_last_ip(&self, record_name: &str, ip: Ipv4Addr) -> Result<(), crate::Error>;
}
