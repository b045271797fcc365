use std::time::Duration;

use tinyurl_cache::{LayeredCache, MokaUrlCache, RedisUrlCache, UrlCache};
use tinyurl_core::ShortCode;
use tinyurl_test_infra::redis::RedisServer;

async fn start_cache(prefix: &str) -> (RedisServer, RedisUrlCache) {
    let server = RedisServer::new().await.expect("start redis");
    let url = server.redis_url().await.expect("redis url");
    let cache = RedisUrlCache::connect(&url, prefix)
        .await
        .expect("connect redis");
    (server, cache)
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

#[tokio::test]
async fn set_get_and_delete() {
    let (_server, cache) = start_cache("url:").await;
    let c = code("1");

    assert!(cache.get_url(&c).await.unwrap().is_none());

    cache
        .set_url(&c, "https://youtube.com", Some(Duration::from_secs(60)))
        .await
        .unwrap();
    assert_eq!(
        cache.get_url(&c).await.unwrap().as_deref(),
        Some("https://youtube.com")
    );

    cache.del(&c).await.unwrap();
    assert!(cache.get_url(&c).await.unwrap().is_none());

    // deleting a missing key is fine
    cache.del(&c).await.unwrap();
}

#[tokio::test]
async fn entries_expire_after_ttl() {
    let (_server, cache) = start_cache("url:").await;
    let c = code("2");

    cache
        .set_url(&c, "https://example.com", Some(Duration::from_millis(100)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(cache.get_url(&c).await.unwrap().is_none());
}

#[tokio::test]
async fn prefixes_isolate_namespaces() {
    let server = RedisServer::new().await.expect("start redis");
    let url = server.redis_url().await.expect("redis url");
    let left = RedisUrlCache::connect(&url, "left:").await.unwrap();
    let right = RedisUrlCache::connect(&url, "right:").await.unwrap();
    let c = code("abc");

    left.set_url(&c, "https://left.example", None).await.unwrap();

    assert!(right.get_url(&c).await.unwrap().is_none());
    assert_eq!(
        left.get_url(&c).await.unwrap().as_deref(),
        Some("https://left.example")
    );
}

#[tokio::test]
async fn layered_cache_backfills_from_redis() {
    let (_server, redis) = start_cache("url:").await;
    let cache = LayeredCache::new(MokaUrlCache::new(), redis);
    let c = code("Zz");

    cache
        .l2()
        .set_url(&c, "https://shared.example", None)
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&c).await.unwrap().as_deref(),
        Some("https://shared.example")
    );
    assert!(cache.l1().get_url(&c).await.unwrap().is_some());
}
