use super::{CacheResult, KeyValueStore, MemoryStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Networked store with a process-local safety net
///
/// Every failure of the primary is logged and absorbed: writes land in the local
/// map, reads consult it, deletes are best-effort on both sides. A successful
/// primary write evicts any local copy so stale fallback data cannot shadow it
/// later.
pub struct FallbackStore {
    primary: Arc<dyn KeyValueStore>,
    local: MemoryStore,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn KeyValueStore>) -> Self {
        Self {
            primary,
            local: MemoryStore::without_expiry(),
        }
    }

    #[cfg(test)]
    fn local(&self) -> &MemoryStore {
        &self.local
    }
}

#[async_trait]
impl KeyValueStore for FallbackStore {
    fn backend_name(&self) -> &'static str {
        "redis+fallback"
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        match self.primary.put(key, value.clone(), ttl).await {
            Ok(()) => self.local.delete(key).await,
            Err(e) => {
                tracing::warn!("Store write failed for {}, keeping it locally: {}", key, e);
                self.local.put(key, value, ttl).await
            }
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.primary.get(key).await {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.local.get(key).await,
            Err(e) => {
                tracing::warn!("Store read failed for {}, using local copy: {}", key, e);
                self.local.get(key).await
            }
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        if let Err(e) = self.primary.delete(key).await {
            tracing::warn!("Store delete failed for {}: {}", key, e);
        }
        self.local.delete(key).await
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        match self.primary.take(key).await {
            Ok(Some(value)) => {
                self.local.delete(key).await?;
                Ok(Some(value))
            }
            Ok(None) => self.local.take(key).await,
            Err(e) => {
                tracing::warn!("Store take failed for {}, using local copy: {}", key, e);
                self.local.take(key).await
            }
        }
    }

    async fn health_check(&self) -> CacheResult<()> {
        self.primary.health_check().await
    }
}
