use super::{CacheResult, KeyValueStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry {
    data: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn new(data: String, ttl: Option<Duration>) -> Self {
        let expires_at = ttl
            .and_then(|duration| chrono::Duration::from_std(duration).ok())
            .map(|duration| Utc::now() + duration);
        Self { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() > exp)
    }
}

/// In-memory store
///
/// Expiry is enforced lazily on access. The fallback flavour created with
/// [`MemoryStore::without_expiry`] ignores TTLs entirely; its entries are
/// removed only by delete/take or overwritten by the next handshake.
#[derive(Clone)]
pub struct MemoryStore {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    honor_ttl: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            honor_ttl: true,
        }
    }

    pub fn without_expiry() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            honor_ttl: false,
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let ttl = if self.honor_ttl { ttl } else { None };
        let mut store = self.store.write().await;
        store.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                drop(store);
                // Clean up expired entry
                self.store.write().await.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        // Single write lock: a concurrent take cannot observe the same entry
        let mut store = self.store.write().await;
        Ok(store
            .remove(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.data))
    }
}
