//! Admin backend server.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    ADMIN BACKEND                     │
//!                 │                                                      │
//!   GET /health   │  ┌──────────┐   read   ┌──────────────────────┐      │
//!   ──────────────┼─▶│   http   │─────────▶│ SharedConnectivity   │      │
//!                 │  │  server  │          │ Unknown/Connected/   │      │
//!                 │  └──────────┘          │ Disconnected         │      │
//!                 │                        └──────────▲───────────┘      │
//!                 │                                   │ write            │
//!                 │  ┌────────────────┐    ┌──────────┴───────────┐      │
//!                 │  │   lifecycle    │───▶│ startup (retries) →  │      │
//!                 │  │  coordinator   │    │ health monitor loop  │      │
//!                 │  └────────────────┘    └──────────┬───────────┘      │
//!                 │                                   │ probe            │
//!                 │                        ┌──────────▼───────────┐      │
//!                 │                        │ prober (timeout race)│──────┼──▶ MySQL
//!                 │                        └──────────────────────┘      │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::net::TcpListener;

use admin_backend::config::load_config;
use admin_backend::http::HttpServer;
use admin_backend::lifecycle::signals::wait_for_termination;
use admin_backend::lifecycle::{Lifecycle, StartOutcome};
use admin_backend::observability::{logging, metrics};
use admin_backend::store::MySqlStore;

#[derive(Parser)]
#[command(name = "admin-backend")]
#[command(about = "Admin backend with database connectivity monitoring", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults plus environment are used when omitted.
    #[arg(short, long, env = "ADMIN_BACKEND_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Instant::now();
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let (config, profile) = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), %profile, "admin-backend starting");
    tracing::info!(
        bind_address = %config.server.bind_address,
        database = ?config.database,
        max_attempts = config.connectivity.max_attempts,
        poll_interval_ms = config.connectivity.poll_interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let store = Arc::new(MySqlStore::new(&config.database));
    let mut lifecycle = Lifecycle::new(store, &config.connectivity)?;

    match lifecycle.start_until(startup_interrupt()).await {
        Ok(StartOutcome::Started) => {}
        Ok(StartOutcome::Interrupted) => {
            lifecycle.shutdown().await;
            tracing::info!("Process terminated");
            return Ok(());
        }
        Err(e) => {
            tracing::error!(error = %e, "Unable to start server");
            lifecycle.shutdown().await;
            return Err(e.into());
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(&config.server, lifecycle.state(), started_at);
    let server_shutdown = lifecycle.server_shutdown().subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    tokio::select! {
        signal = wait_for_termination() => {
            match signal {
                Ok(signal) => tracing::info!(%signal, "Signal received, shutting down gracefully"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for signals, shutting down"),
            }
        }
        res = &mut server_task => {
            tracing::error!(result = ?res, "HTTP server exited unexpectedly");
            lifecycle.shutdown().await;
            return Err("HTTP server exited unexpectedly".into());
        }
    }

    lifecycle.shutdown().await;

    let drain = Duration::from_millis(config.connectivity.shutdown_timeout_ms);
    match tokio::time::timeout(drain, server_task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "HTTP server error during shutdown"),
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server task failed"),
        Err(_) => tracing::warn!("HTTP server did not drain in time"),
    }

    tracing::info!("Process terminated");
    Ok(())
}

/// Resolves on the first termination signal received while starting up.
async fn startup_interrupt() {
    match wait_for_termination().await {
        Ok(signal) => tracing::info!(%signal, "Signal received during startup, aborting"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for signals during startup");
            std::future::pending::<()>().await
        }
    }
}
