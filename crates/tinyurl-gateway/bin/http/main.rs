mod cli;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tinyurl_cache::{LayeredCache, MokaUrlCache, RedisUrlCache, UrlCache};
use tinyurl_gateway::{App, AppState};
use tinyurl_shortener::{ShortenerService, ShortenerSettings};
use tinyurl_storage::{InMemoryRepository, MySqlRepository, Repository};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let _telemetry = tinyurl_telemetry::init_tracing(
        "tinyurl-gateway",
        config.log_format,
        config.otlp_endpoint.as_deref(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        cache_ttl_secs = config.cache_ttl_secs,
        "starting gateway server"
    );

    let cache = build_cache(&config).await?;
    let settings = ShortenerSettings::builder()
        .cache_ttl(Duration::from_secs(config.cache_ttl_secs))
        .build();

    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(&config, InMemoryRepository::new(), cache, settings).await?;
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.ensure_schema().await?;
            run_server(&config, repository, cache, settings).await?;
        }
    }

    info!("gateway server stopped");
    Ok(())
}

async fn build_cache(config: &CLI) -> anyhow::Result<Arc<dyn UrlCache>> {
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let moka = || -> MokaUrlCache {
        MokaUrlCache::builder()
            .max_capacity(config.cache_capacity)
            .default_ttl(ttl)
            .build()
            .into()
    };

    let cache: Arc<dyn UrlCache> = match config.cache {
        CacheBackendArg::Moka => Arc::new(moka()),
        CacheBackendArg::Redis => Arc::new(connect_redis(config, ttl).await?),
        CacheBackendArg::Layered => {
            Arc::new(LayeredCache::new(moka(), connect_redis(config, ttl).await?))
        }
    };
    Ok(cache)
}

async fn connect_redis(config: &CLI, ttl: Duration) -> anyhow::Result<RedisUrlCache> {
    let redis_url = config
        .redis_url
        .as_deref()
        .context("redis url is required for the redis and layered cache backends")?;
    let cache = RedisUrlCache::connect(redis_url, config.cache_key_prefix.as_str()).await?;
    Ok(cache.with_default_ttl(ttl))
}

async fn run_server<R: Repository>(
    config: &CLI,
    repository: R,
    cache: Arc<dyn UrlCache>,
    settings: ShortenerSettings,
) -> anyhow::Result<()> {
    let service = ShortenerService::with_settings(repository, cache, settings);
    let state = AppState::new(Arc::new(service), config.public_base_url.as_str());

    serve(config.listen_addr, App::router(state)).await
}

async fn serve(listen_addr: SocketAddr, router: axum::Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "gateway server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
