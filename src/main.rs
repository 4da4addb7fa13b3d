use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use devcamper_api::config::AppConfig;
use devcamper_api::database::{DatabaseManager, DocumentStore, MemoryStore, PgStore, Repository};
use devcamper_api::routes;
use devcamper_api::services::{EmailService, MapQuestGeocoder};
use devcamper_api::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Postgres when DATABASE_URL is set, memory otherwise
    Auto,
    Memory,
    Postgres,
}

#[derive(Parser)]
#[command(name = "devcamper-api")]
#[command(about = "Bootcamp directory REST API")]
#[command(version)]
struct Args {
    #[arg(long, env = "PORT", help = "Port to listen on (overrides config)")]
    port: Option<u16>,

    #[arg(long, value_enum, default_value_t = StoreKind::Auto, help = "Document store backend")]
    store: StoreKind,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting DevCamper API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; sessions can not be issued");
    }

    let store = connect_store(args.store, &config).await?;
    let geocoder = Arc::new(MapQuestGeocoder::new(&config.geocoder));
    let mailer = Arc::new(EmailService::new(&config.email).context("failed to set up email transport")?);

    let repository = Repository::new(store, geocoder);
    let port = config.server.port;
    let app = routes::app(AppState::new(config, repository, mailer));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("DevCamper API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_store(kind: StoreKind, config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let use_postgres = match kind {
        StoreKind::Memory => false,
        StoreKind::Postgres => true,
        StoreKind::Auto => config.database.url.is_some(),
    };

    if !use_postgres {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;
    DatabaseManager::ensure_schema(&pool)
        .await
        .context("failed to create collection tables")?;
    Ok(Arc::new(PgStore::new(pool)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
