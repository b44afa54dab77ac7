//! Artist database operations

use crate::services::catalog::CatalogArtist;
use discshelf_common::db::Artist;
use discshelf_common::Result;
use sqlx::{SqliteConnection, SqlitePool};

/// Return the id of the stored artist matching `artist`, inserting it if new
///
/// Catalog artists are matched by catalog id; artists without one are
/// matched by exact name among artists that also lack a catalog id.
pub async fn find_or_insert_artist(conn: &mut SqliteConnection, artist: &CatalogArtist) -> Result<i64> {
    let existing: Option<i64> = match artist.id {
        Some(discogs_id) => {
            sqlx::query_scalar(
                "SELECT id FROM artists WHERE discogs_id = ? AND deleted_at IS NULL ORDER BY id LIMIT 1",
            )
            .bind(discogs_id)
            .fetch_optional(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT id FROM artists WHERE discogs_id IS NULL AND name = ? AND deleted_at IS NULL ORDER BY id LIMIT 1",
            )
            .bind(&artist.name)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    if let Some(id) = existing {
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO artists (name, image_url, discogs_id) VALUES (?, ?, ?)")
        .bind(&artist.name)
        .bind(&artist.thumbnail_url)
        .bind(artist.id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(name = %artist.name, "Inserted artist");
    Ok(result.last_insert_rowid())
}

pub async fn get_artist(pool: &SqlitePool, id: i64) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(
        "SELECT id, name, image_url, discogs_id FROM artists WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

/// All artists, sorted by name
pub async fn list_artists(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let artists = sqlx::query_as::<_, Artist>(
        "SELECT id, name, image_url, discogs_id FROM artists WHERE deleted_at IS NULL ORDER BY name COLLATE NOCASE, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(artists)
}
