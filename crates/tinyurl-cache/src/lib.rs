//! Short code to URL caches used in front of the store.

pub mod layered;
pub mod moka;
pub mod redis;

pub use layered::LayeredCache;
pub use moka::{CacheConfig, MokaUrlCache};
pub use redis::{RedisUrlCache, DEFAULT_KEY_PREFIX};
pub use tinyurl_core::{CacheError, UrlCache};
