use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tinyurl_core::{CacheError, ShortCode, UrlCache};
use tracing::{debug, trace, warn};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Each entry is a plain string key (`prefix + code`) holding the original
/// URL, written with `PSETEX` when a TTL applies.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    default_ttl: Option<Duration>,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("timed out") {
        CacheError::Timeout(message)
    } else if lowered.contains("connection refused") || lowered.contains("broken pipe") {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache using [`DEFAULT_KEY_PREFIX`].
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            default_ttl: None,
        }
    }

    /// Opens a multiplexed connection to `redis_url` and wraps it.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    /// Sets the TTL used for entries written without one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Generates the cache key for a short code.
    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching URL from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) => {
                debug!(code = %code, "Cache hit in Redis");
                Ok(Some(url))
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_url(
        &self,
        code: &ShortCode,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, "Storing URL in Redis cache");

        let mut conn = self.conn.clone();
        let result = match ttl.or(self.default_ttl) {
            Some(ttl) => {
                // PSETEX rejects a zero expiry.
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                conn.pset_ex::<_, _, ()>(&key, original_url, millis).await
            }
            None => conn.set::<_, _, ()>(&key, original_url).await,
        };

        match result {
            Ok(()) => {
                debug!(code = %code, "Cached URL in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache URL in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, "Removing URL from Redis cache");

        let mut conn = self.conn.clone();
        match conn.del::<_, ()>(&key).await {
            Ok(()) => {
                debug!(code = %code, "Removed URL from Redis cache");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to remove URL from Redis cache");
                Err(map_redis_error("failed to delete value from Redis", e))
            }
        }
    }
}
