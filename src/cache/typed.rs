//! Typed views over the key/value store
//!
//! Each cached type declares its key namespace, so a `TypedCache<StateData>`
//! keyed by `"{org}:{user}"` reads and writes `state:{org}:{user}`.

use super::{CacheError, CacheResult, KeyValueStore};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Trait for types that live in the ephemeral store
pub trait CachedObject: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key namespace, joined to the caller's key with `:`
    fn cache_prefix() -> &'static str;

    /// Optional type-specific TTL
    fn default_ttl() -> Option<Duration> {
        None
    }
}

/// Typed cache instance for a specific type T
pub struct TypedCache<T: CachedObject> {
    store: Arc<dyn KeyValueStore>,
    _phantom: PhantomData<T>,
}

impl<T: CachedObject> Clone for TypedCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: CachedObject> TypedCache<T> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Full store key for the given key
    pub fn cache_key(key: &str) -> String {
        format!("{}:{}", T::cache_prefix(), key)
    }

    pub async fn get(&self, key: &str) -> CacheResult<Option<T>> {
        match self.store.get(&Self::cache_key(key)).await? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Read and remove in one step
    pub async fn take(&self, key: &str) -> CacheResult<Option<T>> {
        match self.store.take(&Self::cache_key(key)).await? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set_with_ttl(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()> {
        let data =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.store
            .put(&Self::cache_key(key), data, ttl.or_else(T::default_ttl))
            .await
    }

    /// Set with default TTL
    pub async fn set(&self, key: &str, value: &T) -> CacheResult<()> {
        self.set_with_ttl(key, value, None).await
    }

    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        self.store.delete(&Self::cache_key(key)).await
    }
}

/// Decode a stored value, tolerating writers that JSON-encoded an already
/// serialized string
fn decode<T: DeserializeOwned>(raw: &str) -> CacheResult<T> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Ok(value),
        Err(first) => match serde_json::from_str::<String>(raw) {
            Ok(inner) => serde_json::from_str::<T>(&inner)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            Err(_) => Err(CacheError::Serialization(first.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct TestRecord {
        id: i32,
        name: String,
    }

    impl CachedObject for TestRecord {
        fn cache_prefix() -> &'static str {
            "record"
        }

        fn default_ttl() -> Option<Duration> {
            Some(Duration::from_millis(50))
        }
    }

    fn record() -> TestRecord {
        TestRecord {
            id: 1,
            name: "John".to_string(),
        }
    }

    #[tokio::test]
    async fn test_typed_cache_uses_namespaced_keys() {
        let store = Arc::new(MemoryStore::new());
        let cache = TypedCache::<TestRecord>::new(store.clone());

        cache.set("org:user", &record()).await.unwrap();

        let raw = store.get("record:org:user").await.unwrap().unwrap();
        assert_eq!(raw, r#"{"id":1,"name":"John"}"#);
        assert_eq!(cache.get("org:user").await.unwrap(), Some(record()));
    }

    #[tokio::test]
    async fn test_default_ttl_applies() {
        let cache = TypedCache::<TestRecord>::new(Arc::new(MemoryStore::new()));
        cache.set("k", &record()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_take_then_get_is_empty() {
        let cache = TypedCache::<TestRecord>::new(Arc::new(MemoryStore::new()));
        cache.set_with_ttl("k", &record(), None).await.unwrap();

        assert_eq!(cache.take("k").await.unwrap(), Some(record()));
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_double_encoded_value_is_accepted() {
        let store = Arc::new(MemoryStore::new());
        let cache = TypedCache::<TestRecord>::new(store.clone());

        let inner = serde_json::to_string(&record()).unwrap();
        let outer = serde_json::to_string(&inner).unwrap();
        store.put("record:k", outer, None).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(record()));
    }

    #[tokio::test]
    async fn test_garbage_value_is_serialization_error() {
        let store = Arc::new(MemoryStore::new());
        let cache = TypedCache::<TestRecord>::new(store.clone());
        store.put("record:k", "not json".to_string(), None).await.unwrap();

        assert!(matches!(cache.get("k").await, Err(CacheError::Serialization(_))));
    }
}
