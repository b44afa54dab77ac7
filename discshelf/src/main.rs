//! discshelf - personal record shelf backed by the Discogs catalog
//!
//! Serves the library API (import, browse, settings) and the track duration
//! resync over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use discshelf::services::{DiscogsClient, ReconcilerConfig};
use discshelf::AppState;
use discshelf_common::config::{
    default_config_path, get_user_agent, load_toml_config, read_toml_config, RootFolderInitializer,
    RootFolderResolver,
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for discshelf
#[derive(Parser, Debug)]
#[command(name = "discshelf")]
#[command(about = "Personal music library backed by Discogs")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "DISCSHELF_PORT")]
    port: Option<u16>,

    /// Folder holding the library database
    #[arg(short, long, env = "DISCSHELF_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to discshelf.toml
    #[arg(short, long, env = "DISCSHELF_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);

    let log_level = read_toml_config(&config_path)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting discshelf v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build: {} ({}, {})",
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = load_toml_config(&config_path);

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&toml_config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = discshelf_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let token = discshelf::config::resolve_discogs_token(&db_pool, &toml_config)
        .await
        .context("Failed to resolve Discogs token")?;
    let discogs = Arc::new(
        DiscogsClient::new(&get_user_agent(), token).context("Failed to build Discogs client")?,
    );

    let state = AppState::new(db_pool, discogs)
        .with_reconciler_config(ReconcilerConfig::from(&toml_config.reconcile))
        .with_config_path(config_path);
    let app = discshelf::build_router(state);

    let port = args.port.unwrap_or(toml_config.port);
    let addr = format!("{}:{}", toml_config.bind_address, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
