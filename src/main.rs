use std::sync::Arc;

use marquee_api::{
    config::Config,
    db::{self, Cache, PgStore},
    routes::{create_router, AppState},
    services::providers::TmdbProvider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }
    let store = Arc::new(PgStore::new(pool));

    let (cache, cache_handle) = if config.cache_enabled {
        let client = db::create_redis_client(&config.redis_url)?;
        let (cache, handle) = Cache::new(client).await;
        (cache, Some(handle))
    } else {
        tracing::info!("Catalog cache disabled");
        (Cache::disabled(), None)
    };

    let catalog = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let settings = config.recommendation_settings();
    tracing::info!(?settings, "Recommendation engine configured");

    let state = AppState::new(store.clone(), store.clone(), store, catalog, settings);
    let app = create_router(Arc::new(state));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
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
