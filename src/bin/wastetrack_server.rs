//! Wastetrack HTTP server.
//!
//! Loads configuration, installs logging, applies migrations, starts the
//! daily generation scheduler and serves the API until interrupted.

use eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use std::sync::Arc;
use tracing::{info, warn};
use wastetrack::{
    activity::services::ActivityService,
    api::{self, AppState},
    config::Config,
    daily::{DailyScheduler, DailyTaskGenerator},
    database::{apply_migrations, build_pool},
    stand::adapters::postgres::PostgresStandRepository,
    task::{adapters::postgres::PostgresTaskRepository, services::TaskLifecycleService},
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::load().wrap_err("failed to load configuration")?;
    if !init_tracing(&config.logging) {
        warn!("tracing subscriber already installed");
    }

    let offset = config.utc_offset()?;
    let settings = config.schedule_settings()?;
    let database_url = config
        .database
        .url
        .clone()
        .ok_or_else(|| eyre!("database url is required (WASTETRACK_DATABASE_URL)"))?;

    let pool = build_pool(&database_url, config.database.pool_size)
        .wrap_err("failed to build connection pool")?;
    let migration_pool = pool.clone();
    tokio::task::spawn_blocking(move || -> eyre::Result<()> {
        let mut connection = migration_pool.get()?;
        apply_migrations(&mut connection)?;
        Ok(())
    })
    .await
    .wrap_err("migration task panicked")??;

    let clock = Arc::new(DefaultClock);
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let stands = Arc::new(PostgresStandRepository::new(pool));
    let lifecycle = TaskLifecycleService::new(Arc::clone(&tasks), clock);
    let generator = DailyTaskGenerator::new(lifecycle.clone(), stands, offset);
    let scheduler = Arc::new(DailyScheduler::new(generator, settings));
    let scheduler_handle = Arc::clone(&scheduler).spawn();

    if config.api.admin_token.is_none() {
        warn!("no admin token configured; admin endpoints will refuse all calls");
    }
    let state = AppState::new(
        lifecycle,
        ActivityService::new(tasks, offset),
        scheduler,
        offset,
    )
    .with_admin_token(config.api.admin_token.as_deref().map(Arc::from));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "wastetrack listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    scheduler_handle.abort();
    info!("wastetrack stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolves when `signal` fires. A signal that cannot be installed never
/// resolves, so the server keeps running until it is killed.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(err) = signal.await {
        warn!(error = %err, "failed to listen for shutdown signal; serving until killed");
        std::future::pending::<()>().await;
    }
}
