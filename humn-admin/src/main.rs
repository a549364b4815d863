//! humn-admin - HUM人N CRM and story API service
//!
//! Serves the story catalog, visitor registration and the admin area
//! backed by a local SQLite document store.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use humn_admin::services::Services;
use humn_admin::store::SqliteStore;
use humn_admin::{build_router, AppState};
use humn_common::api::SessionSigner;
use humn_common::config::TomlConfig;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for humn-admin
#[derive(Parser, Debug)]
#[command(name = "humn-admin")]
#[command(about = "HUM人N CRM and story API service")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config location)
    #[arg(short, long, env = "HUMN_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port (overrides config)
    #[arg(short, long, env = "HUMN_PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides config)
    #[arg(short, long, env = "HUMN_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        TomlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.storage.database_path = Some(database);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("humn_admin={},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HUM人N admin (humn-admin) v{}", env!("CARGO_PKG_VERSION"));

    if config.admin.email.is_none() || config.admin.password.is_none() {
        warn!("Admin credentials not configured; admin login is disabled");
    }

    let db_path = config.storage.resolved_database_path();
    info!("Database path: {}", db_path.display());
    let store = SqliteStore::open(&db_path)
        .await
        .context("Failed to open database")?;

    let services =
        Services::from_config(&config.integrations).context("Failed to build HTTP clients")?;

    let port = config.server.port;
    let state = AppState::new(Arc::new(store), SessionSigner::generate(), config, services);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("humn-admin listening on http://{}", addr);
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
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
