use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tinyurl_core::{CacheError, ShortCode, UrlCache};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Option<Duration>,
}

/// Expires each entry after the TTL it was written with, falling back to a
/// cache-wide default. Overwriting an entry restarts its clock.
#[derive(Debug, Clone, Copy)]
struct PerEntryTtl {
    default_ttl: Option<Duration>,
}

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// This implementation stores short code to URL mappings in a concurrent,
/// bounded in-memory cache with per-entry TTL. It's suited to single-node
/// deployments or as a L1 cache in front of Redis.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache with default settings.
    ///
    /// The cache holds at most 10,000 entries and only expires entries that
    /// were written with an explicit TTL.
    pub fn new() -> Self {
        CacheConfig::builder().build().into()
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .build()
            .into()
    }

    /// Creates a new Moka URL cache whose entries expire after `default_ttl`
    /// unless written with their own TTL.
    pub fn with_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .default_ttl(default_ttl)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.original_url))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        code: &ShortCode,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        trace!(code = %code, "Storing URL in Moka cache");

        let entry = CachedUrl {
            original_url: original_url.to_owned(),
            ttl,
        };
        self.cache.insert(code.as_str().to_owned(), entry).await;
        debug!(code = %code, ttl = ?ttl, "Cached URL in Moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Removing URL from Moka cache");

        self.cache.invalidate(code.as_str()).await;
        debug!(code = %code, "Removed URL from Moka cache (if present)");
        Ok(())
    }
}

/// Configuration for creating a MokaUrlCache with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_MAX_CAPACITY)]
    max_capacity: u64,
    /// TTL for entries written without one.
    #[builder(default, setter(strip_option))]
    default_ttl: Option<Duration>,
}

impl From<CacheConfig> for MokaUrlCache {
    fn from(config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl {
                default_ttl: config.default_ttl,
            })
            .build();

        MokaUrlCache { cache }
    }
}
