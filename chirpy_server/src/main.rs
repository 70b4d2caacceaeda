//! Chirpy HTTP server.
//!
//! Loads configuration from the environment (and `.env`), connects to
//! PostgreSQL and serves the API until Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use chirpy::{AuthManager, ChirpManager, db::Database};
use chirpy_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the Chirpy server

USAGE:
  chirpy_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string (required)
  JWT_SECRET               JWT signing secret, at least 32 characters (required)
  POLKA_KEY                Webhook API key (required)
  PLATFORM                 Deployment platform; 'dev' enables /admin/reset (required)
  ACCESS_TOKEN_TTL_SECS    Access token lifetime [default: 3600]
  DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT_SECS,
  DB_IDLE_TIMEOUT_SECS, DB_MAX_LIFETIME_SECS
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    info!("Starting Chirpy server at {} ({:?})", config.bind, config.platform);

    let metrics_handle = metrics::init_metrics().map_err(Error::msg)?;

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.health_check().await.context("Database health check failed")?;
    info!("Database connected successfully");

    let repositories = db.repositories();
    let auth_manager = AuthManager::new(
        repositories.users,
        repositories.refresh_tokens,
        config.security.jwt_secret,
    )
    .with_access_token_duration(chrono::Duration::seconds(config.access_token_ttl_secs));
    let chirp_manager = ChirpManager::new(repositories.chirps);

    let api_state = api::AppState {
        auth_manager: Arc::new(auth_manager),
        chirp_manager: Arc::new(chirp_manager),
        polka_key: Arc::from(config.security.polka_key),
        platform: config.platform,
        metrics_handle,
    };

    let app = api::create_router(api_state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
