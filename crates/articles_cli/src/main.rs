use anyhow::Context;
use articles_core::{ArticleRepository, DefaultArticleService};
use articles_storage::{create_repository, StorageConfig};
use articles_web::{create_app, serve, AppState, Metrics};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod logging;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Articles HTTP service", long_about = None)]
pub struct Cli {
    /// Configuration file; defaults to config/default.{yaml,toml,json} when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Storage backend: memory, sqlite or postgres. Overrides the configured value.
    #[arg(long, global = true)]
    storage: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on. Overrides HTTP_PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective configuration and exit
    Config,
}

async fn connect_with_retry(
    storage: &StorageConfig,
    max_retries: u32,
    delay: Duration,
) -> articles_core::Result<Arc<dyn ArticleRepository>> {
    let attempts = max_retries.max(1);
    let mut attempt = 1;

    loop {
        match create_repository(storage).await {
            Ok(repository) => return Ok(repository),
            // a misconfiguration won't fix itself
            Err(e @ articles_core::Error::Config(_)) => return Err(e),
            Err(e) if attempt < attempts => {
                warn!(
                    "Failed to connect to {} storage (attempt {}/{}): {}. Retrying in {}s...",
                    storage.kind(),
                    attempt,
                    attempts,
                    e,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            Ok(())
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.http_port = port;
            }
            logging::init_logging(config.is_local());
            info!(env = %config.app_env, port = config.http_port, "application starting");

            let storage = config.storage_config()?;
            info!("💾 Connecting to {} storage...", storage.kind());
            let repository = connect_with_retry(
                &storage,
                config.db_connect_retries,
                Duration::from_secs(config.db_retry_delay_secs),
            )
            .await
            .with_context(|| format!("failed to connect to {} storage", storage.kind()))?;
            info!("✨ Storage initialized successfully (using {})", storage.kind());

            let service = Arc::new(DefaultArticleService::new(repository));
            let metrics = Metrics::new().context("failed to register metrics")?;
            let app = create_app(AppState::new(service, metrics));

            let listener = tokio::net::TcpListener::bind(config.listen_addr())
                .await
                .with_context(|| format!("failed to bind {}", config.listen_addr()))?;
            serve(listener, app).await.context("server failed")?;

            info!("server stopped");
            Ok(())
        }
    }
}
