use super::{CacheError, CacheResult, KeyValueStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Redis store with a single reusable multiplexed connection
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    connection: Arc<Mutex<Option<redis::aio::MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisStore {
    /// Create new Redis store; the connection is opened lazily
    pub fn new(redis_url: &str, key_prefix: String) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Redis client error: {}", e)))?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
            key_prefix,
        })
    }

    /// Get a working Redis connection, creating or reusing existing one
    async fn get_connection(&self) -> CacheResult<redis::aio::MultiplexedConnection> {
        let mut conn_guard = self.connection.lock().await;

        if let Some(conn) = conn_guard.as_ref() {
            return Ok(conn.clone());
        }

        let new_conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connection(format!("Connection failed: {}", e)))?;

        *conn_guard = Some(new_conn.clone());
        Ok(new_conn)
    }

    /// Drop the cached connection so the next call reconnects
    async fn reset_connection(&self) {
        *self.connection.lock().await = None;
    }

    async fn command_error(&self, e: redis::RedisError) -> CacheError {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            self.reset_connection().await;
            CacheError::Connection(e.to_string())
        } else {
            CacheError::Cache(e.to_string())
        }
    }

    /// Add key prefix to avoid conflicts
    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let key = self.prefixed_key(key);
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<()> = match ttl {
            // SETEX rejects a zero expiry
            Some(ttl) => conn.set_ex(&key, value, ttl.as_secs().max(1)).await,
            None => conn.set(&key, value).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let key = self.prefixed_key(key);
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<Option<String>> = conn.get(&key).await;
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let key = self.prefixed_key(key);
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<()> = conn.del(&key).await;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        let key = self.prefixed_key(key);
        let mut conn = self.get_connection().await?;

        // GETDEL (Redis 6.2+) keeps read-and-delete atomic across processes
        let result: redis::RedisResult<Option<String>> = conn.get_del(&key).await;
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    /// Health check - test Redis connectivity
    async fn health_check(&self) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(self.command_error(e).await),
        }
    }
}
