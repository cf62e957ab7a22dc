//! Redis cache implementation.
//!
//! Services depend on the [`CacheStore`] trait and receive it injected, so
//! the backing store can be swapped for an in-memory one in tests.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// String key/value cache with per-entry expiry.
///
/// Values are stored exactly as given and returned byte for byte.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value, `None` if absent or expired
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value that expires after `ttl_seconds`
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()>;

    /// Check if a key exists in cache
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await.map_err(cache_error)?;
        Ok(exists)
    }
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
