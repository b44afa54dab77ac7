//! Track database operations

use crate::services::duration_reconciler::{AlbumRef, PendingTrack, TrackStore};
use async_trait::async_trait;
use discshelf_common::db::Track;
use discshelf_common::Result;
use sqlx::SqlitePool;

/// Tracks whose duration is NULL or whitespace-only, ordered by album then id
pub async fn tracks_missing_duration(pool: &SqlitePool) -> Result<Vec<PendingTrack>> {
    let rows: Vec<(i64, Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT id, title, album_id
        FROM tracks
        WHERE (duration IS NULL OR TRIM(duration) = '')
          AND deleted_at IS NULL
        ORDER BY album_id, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(track_id, title, album_id)| PendingTrack {
            track_id,
            title,
            album_id,
        })
        .collect())
}

/// Album catalog id and owning artist name
pub async fn album_context(pool: &SqlitePool, album_id: i64) -> Result<Option<AlbumRef>> {
    let row: Option<(i64, Option<i64>, Option<String>)> = sqlx::query_as(
        r#"
        SELECT al.id, al.discogs_id, ar.name
        FROM albums al
        LEFT JOIN artists ar ON ar.id = al.artist_id
        WHERE al.id = ?
        "#,
    )
    .bind(album_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(album_id, discogs_id, artist_name)| AlbumRef {
        album_id,
        discogs_id,
        artist_name,
    }))
}

/// Set the duration of a track that still has none
///
/// Returns false if the track is gone or already has a duration.
pub async fn set_track_duration_if_missing(pool: &SqlitePool, track_id: i64, duration: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE tracks SET duration = ? WHERE id = ? AND (duration IS NULL OR TRIM(duration) = '')",
    )
    .bind(duration)
    .bind(track_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Tracks of one album in insertion order
pub async fn tracks_for_album(pool: &SqlitePool, album_id: i64) -> Result<Vec<Track>> {
    let tracks = sqlx::query_as::<_, Track>(
        "SELECT id, title, duration, album_id FROM tracks WHERE album_id = ? AND deleted_at IS NULL ORDER BY id",
    )
    .bind(album_id)
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// [`TrackStore`] backed by the library database
#[derive(Clone)]
pub struct SqliteTrackStore {
    pool: SqlitePool,
}

impl SqliteTrackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackStore for SqliteTrackStore {
    async fn tracks_missing_duration(&self) -> Result<Vec<PendingTrack>> {
        tracks_missing_duration(&self.pool).await
    }

    async fn album_context(&self, album_id: i64) -> Result<Option<AlbumRef>> {
        album_context(&self.pool, album_id).await
    }

    async fn persist_track_duration(&self, track_id: i64, duration: &str) -> Result<bool> {
        set_track_duration_if_missing(&self.pool, track_id, duration).await
    }
}
