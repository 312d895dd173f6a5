use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// "memory" or "redis"
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Prepended to every Redis key; empty keeps the `state:`/`credentials:` layout shared with the host
    #[serde(default)]
    pub redis_key_prefix: String,
    /// Keep serving from a process-local map when Redis is unreachable
    #[serde(default = "default_fallback_to_memory")]
    pub fallback_to_memory: bool,
}

fn default_cache_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_fallback_to_memory() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            redis_url: default_redis_url(),
            redis_key_prefix: String::new(),
            fallback_to_memory: default_fallback_to_memory(),
        }
    }
}
