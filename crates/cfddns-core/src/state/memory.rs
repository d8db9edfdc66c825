// Last-known addresses, held only for the life of the process.
//
// Nothing survives a restart: the first tick afterwards sees an empty store,
// treats whatever address it observes as new and rewrites the record once.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateRecord, StateStore};

/// Record name to last confirmed address
///
/// Clones are handles onto one shared map, which lets tests keep a handle
/// while the engine owns another.
///
/// ```rust,no_run
/// # use cfddns_core::state::MemoryStateStore;
/// # use cfddns_core::traits::StateStore;
/// # use std::net::Ipv4Addr;
/// # async fn demo() -> cfddns_core::Result<()> {
/// let store = MemoryStateStore::new();
/// store.set_last_ip("home.example.com", Ipv4Addr::new(203, 0, 113, 7)).await?;
/// assert_eq!(
///     store.get_last_ip("home.example.com").await?,
///     Some(Ipv4Addr::new(203, 0, 113, 7))
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, StateRecord>>>,
}

impl MemoryStateStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first confirmed update
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get_record(&self, record_name: &str) -> Result<Option<StateRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(record_name).cloned())
    }

    async fn set_last_ip(&self, record_name: &str, ip: Ipv4Addr) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(record_name.to_string(), StateRecord::new(ip));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let store = MemoryStateStore::new();

        assert!(store.is_empty().await);
        assert_eq!(store.get_last_ip("home.example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_address() {
        let store = MemoryStateStore::new();
        let first: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let second: Ipv4Addr = "2.2.2.2".parse().unwrap();

        store.set_last_ip("home.example.com", first).await.unwrap();
        store.set_last_ip("home.example.com", second).await.unwrap();

        let record = store.get_record("home.example.com").await.unwrap().unwrap();
        assert_eq!(record.last_ip, second);
        assert!(record.last_updated <= chrono::Utc::now());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStateStore::new();
        let handle = store.clone();

        store
            .set_last_ip("home.example.com", Ipv4Addr::new(9, 9, 9, 9))
            .await
            .unwrap();

        assert_eq!(
            handle.get_last_ip("home.example.com").await.unwrap(),
            Some(Ipv4Addr::new(9, 9, 9, 9))
        );
    }
}
