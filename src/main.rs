// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group Run Tracker API Server
//!
//! Logs runs reported from chat groups, serves per-group stats and
//! leaderboards, and sends a daily reminder to members who have not run.

use group_run_tracker::{
    config::Config,
    db::RunStore,
    services::{LogNotifier, NotificationSink, SystemClock, WebhookNotifier},
    AppState,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        reminder_time = %config.reminder_time,
        "Starting Group Run Tracker API"
    );

    // Open database and apply migrations
    let store = RunStore::connect(&config.database_url).await?;
    tracing::info!(url = %config.database_url, "Database ready");

    let sink: Arc<dyn NotificationSink> = match &config.reminder_webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Delivering reminders to webhook");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            tracing::info!("No webhook configured, reminders are logged only");
            Arc::new(LogNotifier)
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        sink,
        Arc::new(SystemClock),
    ));

    // Reminder scheduler runs until shutdown is signalled
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = state.scheduler.clone();
    let scheduler_task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    // Build router
    let app = group_run_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    if let Err(e) = scheduler_task.await {
        tracing::warn!(error = %e, "Reminder scheduler task ended abnormally");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("group_run_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
