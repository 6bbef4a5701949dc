//! pickup-dash - farmer pickup dashboard service
//!
//! Stores uploaded farmer pickup records, forwards them to the external
//! clustering service, and persists the cluster/truck assignments it returns.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pickup_common::config::TomlConfig;
use pickup_common::db::init_database;
use pickup_dash::config::{Args, Settings};
use pickup_dash::ml::HttpMlGateway;
use pickup_dash::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pickup_dash=info,pickup_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting pickup-dash v{}", env!("CARGO_PKG_VERSION"));

    let file_config = TomlConfig::load_or_default(args.config.as_deref());
    let settings = Settings::resolve(args, file_config);

    if settings.db_credentials_supplied {
        warn!("DB_USER/DB_PASS are set but the SQLite store takes no credentials; ignoring");
    }

    info!("Database path: {}", settings.database_path.display());
    let pool = init_database(&settings.database_path)
        .await
        .context("Failed to open database")?;

    let gateway = HttpMlGateway::new(&settings.ml_url, settings.ml_timeout)
        .context("Failed to create ML service client")?;
    info!("ML service: {}", gateway.base_url());

    let state = AppState::new(pool, Arc::new(gateway))
        .with_max_upload_bytes(settings.max_upload_bytes);
    let app = build_router(state);

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("pickup-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
