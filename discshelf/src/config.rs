//! Discogs token resolution
//!
//! Database → ENV → TOML priority. The settings endpoint writes the database
//! and mirrors the token into the TOML file on a best-effort basis.

use discshelf_common::config::{read_toml_config, write_toml_config, TomlConfig};
use discshelf_common::Result;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{info, warn};

pub const DISCOGS_TOKEN_ENV: &str = "DISCSHELF_DISCOGS_TOKEN";

/// Non-empty, non-whitespace
pub fn is_valid_token(token: &str) -> bool {
    !token.trim().is_empty()
}

/// Resolve the Discogs token from database, environment, then TOML
///
/// A missing token is not an error: the service runs and catalog-backed
/// endpoints report it per request.
pub async fn resolve_discogs_token(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let db_token = crate::db::settings::get_discogs_api_token(db)
        .await?
        .filter(|t| is_valid_token(t));
    let env_token = std::env::var(DISCOGS_TOKEN_ENV)
        .ok()
        .filter(|t| is_valid_token(t));
    let toml_token = toml_config
        .discogs_token
        .clone()
        .filter(|t| is_valid_token(t));

    let sources: Vec<&str> = [
        db_token.as_ref().map(|_| "database"),
        env_token.as_ref().map(|_| "environment"),
        toml_token.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            "Discogs token found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    let resolved = db_token.or(env_token).or(toml_token);
    match sources.first() {
        Some(source) => info!("Discogs token loaded from {}", source),
        None => warn!("Discogs token not configured; catalog requests will fail until it is set"),
    }

    Ok(resolved)
}

/// Mirror the token into the TOML file
///
/// Write failures are logged and swallowed; the database stays authoritative.
pub fn sync_token_to_toml(token: &str, toml_path: &Path) {
    let mut config = if toml_path.exists() {
        match read_toml_config(toml_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Not syncing token, existing TOML unreadable: {}", e);
                return;
            }
        }
    } else {
        TomlConfig::default()
    };

    config.discogs_token = Some(token.to_string());

    match write_toml_config(&config, toml_path) {
        Ok(()) => info!("Discogs token synced to TOML: {}", toml_path.display()),
        Err(e) => warn!("TOML write failed (database write succeeded): {}", e),
    }
}
