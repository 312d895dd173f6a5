//! Ephemeral key/value storage for OAuth handshakes
//!
//! Every value lives for minutes at most: state tokens between the authorize
//! redirect and the callback, and credential blobs between the callback and the
//! frontend's single pickup. Backends implement [`KeyValueStore`]; the
//! [`CacheManager`] picks one at startup and hands out [`TypedCache`] views.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod fallback;
pub mod memory;
pub mod redis;
pub mod typed;

pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use typed::{CachedObject, TypedCache};

use crate::cache::config::CacheConfig;
use crate::health::{ComponentHealth, HealthChecker};

/// Cache error types
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Capability interface over the shared store
///
/// Values are JSON text so other processes of the host application can read
/// the same keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Atomically read and remove a key
    async fn take(&self, key: &str) -> CacheResult<Option<String>>;

    async fn health_check(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// Cache manager - owns the selected backend and creates typed views over it
#[derive(Clone)]
pub struct CacheManager {
    config: CacheConfig,
    store: Arc<dyn KeyValueStore>,
}

impl CacheManager {
    /// Create new cache manager with memory cache (for testing/single instance)
    pub fn new_memory() -> Self {
        Self {
            config: CacheConfig::default(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Create a cache manager over an already constructed store
    pub fn with_store(config: CacheConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self { config, store }
    }

    /// Create cache manager from configuration
    pub async fn new_from_config(config: &CacheConfig) -> CacheResult<Self> {
        let store: Arc<dyn KeyValueStore> = match config.backend.as_str() {
            "memory" => Arc::new(MemoryStore::new()),
            "redis" => {
                let redis = RedisStore::new(&config.redis_url, config.redis_key_prefix.clone())?;

                // Probe early so a misconfigured URL is visible at startup
                if let Err(e) = redis.health_check().await {
                    if !config.fallback_to_memory {
                        return Err(e);
                    }
                    tracing::warn!(
                        "Redis unavailable at startup, serving from process-local fallback: {}",
                        e
                    );
                }

                if config.fallback_to_memory {
                    Arc::new(FallbackStore::new(Arc::new(redis)))
                } else {
                    Arc::new(redis)
                }
            }
            other => {
                return Err(CacheError::Cache(format!("Unknown cache backend: {other}")));
            }
        };

        tracing::info!("Using {} cache backend", store.backend_name());

        Ok(Self {
            config: config.clone(),
            store,
        })
    }

    /// Get a typed cache for type T
    pub fn cache<T: CachedObject>(&self) -> TypedCache<T> {
        TypedCache::new(self.store.clone())
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn backend_type(&self) -> &str {
        self.store.backend_name()
    }

    async fn health_check(&self) -> ComponentHealth {
        match self.store.health_check().await {
            Ok(()) => ComponentHealth::healthy(serde_json::json!({
                "backend": self.backend_type(),
                "configured_backend": self.config.backend,
                "status": "healthy"
            })),
            Err(err) => {
                let details = serde_json::json!({
                    "backend": self.backend_type(),
                    "configured_backend": self.config.backend,
                    "error": err.to_string()
                });
                // The fallback keeps handshakes working, so an outage only degrades us
                if self.config.fallback_to_memory {
                    ComponentHealth::degraded(
                        "Shared store unreachable, using process-local fallback",
                        details,
                    )
                } else {
                    ComponentHealth::unhealthy(
                        "Shared store health check failed",
                        details,
                    )
                }
            }
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new_memory()
    }
}

#[async_trait]
impl HealthChecker for CacheManager {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> ComponentHealth {
        self.health_check().await
    }
}
