use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use reelfeed_api::{
    api::{create_router, AppState},
    cache::{create_redis_client, Cache},
    config::Config,
    services::{CachedRecommender, HttpRecommender, RestPreferenceStore, TmdbCatalog},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let timeout = Duration::from_secs(config.upstream_timeout_secs);

    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let store = Arc::new(RestPreferenceStore::new(config.store_url.clone(), timeout)?);
    let catalog = Arc::new(TmdbCatalog::new(
        config.catalog_api_url.clone(),
        config.catalog_api_key.clone(),
        timeout,
    )?);
    let recommender = Arc::new(HttpRecommender::new(
        config.recommender_url.clone(),
        timeout,
    )?);
    let recommender = Arc::new(CachedRecommender::new(recommender, cache));

    let state = AppState::new(store, catalog, recommender);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "reelfeed-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
