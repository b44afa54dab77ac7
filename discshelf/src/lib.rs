//! discshelf library interface
//!
//! Exposes the router, state and services for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::services::{Catalog, DiscogsClient, ReconcilerConfig};
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Live Discogs client; the settings endpoint swaps its token
    pub discogs: Arc<DiscogsClient>,
    /// Catalog used by import and resync (the Discogs client unless replaced)
    pub catalog: Arc<dyn Catalog>,
    pub reconciler_config: ReconcilerConfig,
    /// TOML file the token is mirrored to, if any
    pub config_path: Option<PathBuf>,
    /// Set while a duration resync runs
    pub resync_running: Arc<AtomicBool>,
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, discogs: Arc<DiscogsClient>) -> Self {
        Self {
            db,
            catalog: discogs.clone(),
            discogs,
            reconciler_config: ReconcilerConfig::default(),
            config_path: None,
            resync_running: Arc::new(AtomicBool::new(false)),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_reconciler_config(mut self, config: ReconcilerConfig) -> Self {
        self.reconciler_config = config;
        self
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Remember `message` for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::resync_routes())
        .merge(api::settings_routes())
        .merge(api::discogs_routes())
        .merge(api::album_routes())
        .merge(api::artist_routes())
        .merge(api::genre_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
