//! Settings database operations
//!
//! Key-value accessors over the `settings` table.

use sqlx::{Pool, Sqlite};
use discshelf_common::{Error, Result};

const DISCOGS_API_TOKEN_KEY: &str = "discogs_api_token";

/// Get Discogs API token from database
///
/// **Returns:** Some(token) if stored, None if not set
pub async fn get_discogs_api_token(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, DISCOGS_API_TOKEN_KEY).await
}

/// Set Discogs API token in database (insert or replace)
pub async fn set_discogs_api_token(db: &Pool<Sqlite>, token: &str) -> Result<()> {
    set_setting(db, DISCOGS_API_TOKEN_KEY, token).await
}

/// Generic setting getter (internal)
async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (internal)
async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}
