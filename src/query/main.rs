//! Query server for jurisdiction matching.
//!
//! Serves the HTTP API over a directory snapshot and, when the directory
//! comes from a file or URL, periodically reloads it in the background.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use beacon::api::{self, AppState};
use beacon::config::Config;
use beacon::directory::{DirectorySource, SharedDirectory};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Jurisdiction matching query server")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,

    /// Directory source ("seed", file path or URL), overrides the config file
    #[arg(long)]
    directory: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(directory) = args.directory {
        config.directory.source = directory;
    }

    info!("Beacon Query Server");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.directory.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let source = config.directory.source();
    info!("Loading directory from {}", source.describe());
    let initial = source
        .load(&client)
        .await
        .with_context(|| format!("Failed to load directory from {}", source.describe()))?;
    info!("Loaded {} authorities", initial.len());

    let directory = SharedDirectory::new(initial);
    let matcher = config.build_matcher()?;

    if config.directory.reload_interval_secs > 0 && source.is_reloadable() {
        let interval = Duration::from_secs(config.directory.reload_interval_secs);
        info!("Reloading directory every {:?}", interval);
        tokio::spawn(reload_loop(source, client, directory.clone(), interval));
    }

    let state = Arc::new(AppState::new(directory, matcher));
    let app = api::router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Publish a fresh snapshot every `interval`. A failed load keeps serving
/// the previous one.
async fn reload_loop(
    source: DirectorySource,
    client: reqwest::Client,
    directory: SharedDirectory,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately and the initial load already happened.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match source.load(&client).await {
            Ok(fresh) => {
                directory.replace(fresh);
            }
            Err(e) => {
                warn!(
                    "Directory reload from {} failed, keeping version {}: {}",
                    source.describe(),
                    directory.version(),
                    e
                );
            }
        }
    }
}
