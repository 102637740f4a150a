mod config;
mod errors;
mod ingest;
mod notify;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::notify::{InMemoryRateLimitStore, LogNotifier, RateLimitStore};
use crate::routes::build_router;
use crate::state::AppState;

/// Rate-limit history older than this is never consulted again.
const RATE_LIMIT_HORIZON_HOURS: i64 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fornix API v{}", env!("CARGO_PKG_VERSION"));

    let rate_limits = Arc::new(InMemoryRateLimitStore::new());
    spawn_rate_limit_sweeper(
        rate_limits.clone(),
        Duration::from_secs(config.rate_limit_sweep_secs.max(1)),
    );
    info!(
        "Rate-limit store initialized (sweep every {}s)",
        config.rate_limit_sweep_secs
    );

    let state = AppState {
        config: config.clone(),
        rate_limits,
        notifier: Arc::new(LogNotifier),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically evicts rate-limit timestamps past the longest window.
fn spawn_rate_limit_sweeper(store: Arc<dyn RateLimitStore>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let tracked = store.sweep(
                chrono::Utc::now(),
                chrono::Duration::hours(RATE_LIMIT_HORIZON_HOURS),
            );
            debug!(tracked, "Rate-limit store swept");
        }
    });
}
