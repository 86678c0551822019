use std::sync::Arc;

use flyaway_recs::{
    config::{CacheBackend, Config},
    db::{
        create_pool, create_redis_client, CacheWriterHandle, InMemoryRecommendationStore,
        PgPlaceRepository, RecommendationStore, RedisRecommendationStore,
    },
    routes::{create_router, AppState},
    services::RecommendationService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    let places = Arc::new(PgPlaceRepository::new(db_pool));

    let (store, cache_writer): (Arc<dyn RecommendationStore>, Option<CacheWriterHandle>) =
        match config.cache_backend {
            CacheBackend::Redis => {
                let client = create_redis_client(&config.redis_url)?;
                let (store, handle) = RedisRecommendationStore::new(client, config.cache_ttl());
                (Arc::new(store) as Arc<dyn RecommendationStore>, Some(handle))
            }
            CacheBackend::Memory => {
                let store = InMemoryRecommendationStore::new(config.cache_ttl());
                (Arc::new(store) as Arc<dyn RecommendationStore>, None)
            }
        };

    let http_client = reqwest::Client::builder().build()?;
    let service = RecommendationService::from_config(&config, http_client, places, store)?;

    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        endpoints = config.overpass_urls.len(),
        cache_backend = ?config.cache_backend,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
