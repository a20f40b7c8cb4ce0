use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cipherstudio_api::app::{app, AppState};
use cipherstudio_api::auth::JwtKeys;
use cipherstudio_api::config::{self, AppConfig, StorageBackend};
use cipherstudio_api::database::{
    DatabaseManager, MemoryProjectRepository, PgProjectRepository, ProjectRepository,
};

#[derive(Parser)]
#[command(name = "cipherstudio-api", version, about = "CipherStudio backend API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides HOST")]
        host: Option<String>,
        #[arg(long, help = "Listen port, overrides PORT")]
        port: Option<u16>,
        #[arg(long, help = "Storage backend: postgres or memory")]
        storage: Option<StorageBackend>,
    },

    #[command(about = "Mint a bearer token for local development")]
    Token {
        #[arg(help = "User identifier to embed in the token")]
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cipherstudio_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = config::config().clone();

    match cli.command {
        Some(Command::Token { user_id }) => {
            let token = JwtKeys::from_config(&config.security)
                .generate_jwt(&user_id)
                .context("failed to mint token")?;
            println!("{}", token);
            Ok(())
        }
        Some(Command::Serve { host, port, storage }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(storage) = storage {
                config.storage.backend = storage;
            }
            serve(config).await
        }
        None => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting CipherStudio API in {:?} mode", config.environment);

    let keys = JwtKeys::from_config(&config.security);
    if !keys.is_configured() {
        anyhow::bail!("JWT_SECRET must be set to verify bearer tokens");
    }

    let repo: Arc<dyn ProjectRepository> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            if config.database.bootstrap_schema {
                DatabaseManager::bootstrap_schema(&pool).await?;
            }
            Arc::new(PgProjectRepository::new(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; projects are lost on exit");
            Arc::new(MemoryProjectRepository::new())
        }
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;
    let environment = config.environment.as_str();
    let state = AppState::new(repo, keys, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("CipherStudio Backend running on port {}", port);
    info!("API available at http://{}", bind_addr);
    info!("Environment: {}", environment);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
