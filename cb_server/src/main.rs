//! Bracket tournament HTTP server.
//!
//! Serves tournament registration and single-elimination brackets backed by
//! PostgreSQL, or by process memory for local runs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use cb_server::{
    api,
    config::{ServerConfig, StoreKind},
    logging, metrics,
};
use cue_bracket::db::{Database, MemoryRepository};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the cue bracket tournament server

USAGE:
  cb_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --memory                 Keep everything in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  STORE                        postgres or memory
  DATABASE_URL                 PostgreSQL connection string
  DB_MAX_CONNECTIONS           Pool size
  METRICS_BIND                 Prometheus exporter address, disabled when unset
  DEFAULT_TABLES_PER_BRACKET   Tables used when a bracket request omits them
  DEFAULT_RACE_TO              Race-to used when a bracket request omits it
  RUST_LOG                     Log filter
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let memory = pargs.contains("--memory");
    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url, memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let state = match config.store {
        StoreKind::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            api::AppState::new(Arc::new(MemoryRepository::new()), config.bracket_defaults)
        }
        StoreKind::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.run_migrations()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            info!("Database connected and migrated");
            api::AppState::new(Arc::new(db.repository()), config.bracket_defaults)
        }
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
