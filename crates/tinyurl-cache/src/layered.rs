use async_trait::async_trait;
use std::time::Duration;
use tinyurl_core::{CacheError, ShortCode, UrlCache};
use tracing::{debug, trace, warn};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A multi-layer cache that composes two cache implementations.
///
/// L1 is typically a fast, local cache (Moka) and L2 a shared, slower one
/// (Redis).
///
/// # Operation Strategy
///
/// - **Get**: Try L1 first, if miss try L2. If L2 has the value, populate L1
///   with it. A failing L1 is skipped rather than failing the read.
/// - **Set**: Write to L2 then L1 with the same TTL (write-through).
/// - **Delete**: Remove from both L1 and L2.
///
/// L1 backfills from L2 use L1's default TTL, since L2 does not report the
/// remaining lifetime of an entry. Keep L1's default TTL short.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tinyurl_cache::{LayeredCache, MokaUrlCache};
///
/// // L1: in-memory, short-lived backfills
/// let l1 = MokaUrlCache::with_ttl(10_000, Duration::from_secs(60));
///
/// // L2: e.g. Redis
/// // let l2 = RedisUrlCache::new(redis_conn);
/// // let cache = LayeredCache::new(l1, l2);
/// # let _ = l1;
/// ```
#[derive(Debug, Clone)]
pub struct LayeredCache<L1, L2> {
    l1: L1,
    l2: L2,
}

impl<L1, L2> LayeredCache<L1, L2> {
    /// Creates a new layered cache with the given L1 and L2 caches.
    pub fn new(l1: L1, l2: L2) -> Self {
        Self { l1, l2 }
    }

    /// Returns a reference to the L1 cache.
    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    /// Returns a reference to the L2 cache.
    pub fn l2(&self) -> &L2 {
        &self.l2
    }

    /// Consumes the layered cache and returns the inner caches.
    pub fn into_inner(self) -> (L1, L2) {
        (self.l1, self.l2)
    }
}

#[async_trait]
impl<L1, L2> UrlCache for LayeredCache<L1, L2>
where
    L1: UrlCache,
    L2: UrlCache,
{
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching URL from layered cache");

        match self.l1.get_url(code).await {
            Ok(Some(url)) => {
                debug!(code = %code, "L1 cache hit");
                return Ok(Some(url));
            }
            Ok(None) => trace!(code = %code, "L1 cache miss, trying L2"),
            Err(e) => warn!(code = %code, error = %e, "L1 cache error, trying L2"),
        }

        match self.l2.get_url(code).await? {
            Some(url) => {
                debug!(code = %code, "L2 cache hit, backfilling L1");
                if let Err(e) = self.l1.set_url(code, &url, None).await {
                    warn!(code = %code, error = %e, "Failed to backfill L1");
                }
                Ok(Some(url))
            }
            None => {
                trace!(code = %code, "L2 cache miss");
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
        trace!(code = %code, "Storing URL in layered cache");

        // L2 first: it is the layer shared across instances.
        self.l2.set_url(code, original_url, ttl).await?;
        self.l1.set_url(code, original_url, ttl).await?;
        debug!(code = %code, "Stored in L1 and L2 caches");

        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Removing URL from layered cache");

        self.l1.del(code).await?;
        self.l2.del(code).await?;
        debug!(code = %code, "Removed from L1 and L2 caches");

        Ok(())
    }
}
