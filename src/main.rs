//! defend-herald entry point.
//!
//! Wires the poll loop and the status API around one shared store, then
//! runs both until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use defend_herald::api;
use defend_herald::app_state::AppState;
use defend_herald::config::HeraldConfig;
use defend_herald::notify::{DiscordNotifier, Notifier};
use defend_herald::persistence::{EventStore, MemoryStore, PostgresPersistence};
use defend_herald::service::{OutcomeResolver, PollDriver, Reconciler};
use defend_herald::shutdown;
use defend_herald::upstream::{CampaignSource, HttpCampaignSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = HeraldConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_json);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), ?config, "starting defend-herald");

    // Build persistence layer
    let (store, pool) = open_store(&config).await?;

    // Build collaborators
    let notifier = DiscordNotifier::new(
        config.discord_api_url.as_str(),
        config.discord_token.as_str(),
        config.discord_channel_id.as_str(),
        config.notify_timeout(),
    )?;
    notifier
        .authenticate()
        .await
        .context("cannot authenticate with discord")?;
    let notifier: Arc<dyn Notifier> = Arc::new(notifier);

    let source: Arc<dyn CampaignSource> = Arc::new(HttpCampaignSource::new(
        config.upstream_url.as_str(),
        config.upstream_timeout(),
        config.upstream_accept_invalid_certs,
    )?);

    // Build service layer
    let reconciler = Reconciler::new(
        Arc::clone(&store),
        notifier,
        OutcomeResolver::new(Arc::clone(&source)),
        config.announce_same_id_outcome,
    );
    let driver = PollDriver::new(
        source,
        Arc::clone(&store),
        reconciler,
        config.poll_interval(),
    );

    // Shutdown fan-out
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let poller = tokio::spawn(driver.run(shutdown_rx.clone()));

    // Start server
    if config.status_api_enabled {
        let app = Router::new()
            .merge(api::build_router())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(10)))
            .with_state(AppState::new(Arc::clone(&store)));

        let listener = tokio::net::TcpListener::bind(config.listen_addr)
            .await
            .with_context(|| format!("cannot bind {}", config.listen_addr))?;
        tracing::info!(addr = %config.listen_addr, "status API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait_for(shutdown_rx))
            .await?;
    } else {
        tracing::info!("status API disabled");
    }

    if let Err(e) = poller.await {
        tracing::error!(error = %e, "poll driver task failed");
    }

    if let Some(pool) = pool {
        tracing::info!("closing database connections");
        pool.close().await;
    }
    tracing::info!("shutdown complete");

    Ok(())
}

/// Initializes the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Opens the configured store; the pool is returned so it can be closed on
/// shutdown.
async fn open_store(
    config: &HeraldConfig,
) -> anyhow::Result<(Arc<dyn EventStore>, Option<PgPool>)> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled, state is lost on restart");
        return Ok((Arc::new(MemoryStore::new()), None));
    }

    tracing::info!("connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
        .context("cannot connect to database")?;

    if config.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("cannot run database migrations")?;
    }

    let store: Arc<dyn EventStore> = Arc::new(PostgresPersistence::new(pool.clone()));
    Ok((store, Some(pool)))
}
