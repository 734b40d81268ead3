mod analysis;
mod cache;
mod chat;
mod config;
mod context;
mod db;
mod errors;
mod extract;
mod llm_client;
mod models;
mod rate_limit;
mod routes;
mod seed;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::redis_store::RedisCounterStore;
use crate::cache::CounterStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{provider_from_config, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;
use crate::store::PortfolioStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a production deploy without a salt)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL is optional; without it the profile endpoint answers 503
    let pool = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            match seed::load(&config)? {
                Some(data) if !data.is_empty() => seed::apply(&pool, &data).await?,
                Some(_) => info!("Seed bundle is empty, nothing to apply"),
                None => {}
            }
            Some(pool)
        }
        None => {
            warn!("DATABASE_URL not set, running without a database");
            None
        }
    };
    let store = pool
        .clone()
        .map(|pool| Arc::new(PgStore::new(pool)) as Arc<dyn PortfolioStore>);

    // Redis is optional; rate limiting falls back to the in-process map
    let counters: Option<Arc<dyn CounterStore>> = match &config.redis_url {
        Some(url) => match RedisCounterStore::connect(url).await {
            Ok(redis) => Some(Arc::new(redis)),
            Err(e) => {
                warn!("Redis unavailable ({e}), using in-memory rate limiting");
                None
            }
        },
        None => {
            info!("REDIS_URL not set, using in-memory rate limiting");
            None
        }
    };

    let llm = LlmClient::new(provider_from_config(&config));
    info!("LLM client initialized (provider: {})", llm.provider_name());

    let state = AppState::new(store, counters, llm, &config.ip_hash_salt);
    let sweeper = state.rate_limiter.local().spawn_sweeper();

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("Folio API stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install CTRL+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, draining connections");
}
