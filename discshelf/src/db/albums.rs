//! Album database operations

use crate::db::artists::find_or_insert_artist;
use crate::services::catalog::{CatalogArtist, TracklistEntry};
use discshelf_common::db::Album;
use discshelf_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// Album fields as imported from the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    pub year: String,
    pub discogs_id: Option<i64>,
    pub genres: String,
    pub styles: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedAlbum {
    pub album_id: i64,
    pub artist_id: i64,
}

/// Album joined with its owning artist, as shown in the album grid
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlbumGridRow {
    pub id: i64,
    pub title: Option<String>,
    pub year: Option<String>,
    pub genres: Option<String>,
    pub styles: Option<String>,
    pub image_url: Option<String>,
    pub discogs_id: Option<i64>,
    pub artist_id: i64,
    pub artist_name: Option<String>,
}

/// Save an imported album with its artists and tracks
///
/// Runs in one transaction. Every credited artist is stored (or reused); the
/// first one owns the album. Heading entries of the tracklist are not stored.
pub async fn save_album(
    pool: &SqlitePool,
    album: &NewAlbum,
    artists: &[CatalogArtist],
    tracklist: &[TracklistEntry],
) -> Result<SavedAlbum> {
    if artists.is_empty() {
        return Err(Error::InvalidInput("Album has no artists".to_string()));
    }

    let mut tx = pool.begin().await?;

    let mut owner = None;
    for artist in artists {
        let artist_id = find_or_insert_artist(&mut tx, artist).await?;
        owner.get_or_insert(artist_id);
    }
    let artist_id = owner.ok_or_else(|| Error::Internal("No owning artist".to_string()))?;

    let album_id = sqlx::query(
        r#"
        INSERT INTO albums (title, year, genres, styles, discogs_id, image_url, artist_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&album.title)
    .bind(&album.year)
    .bind(&album.genres)
    .bind(&album.styles)
    .bind(album.discogs_id)
    .bind(&album.image_url)
    .bind(artist_id)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let mut stored_tracks = 0;
    for track in tracklist.iter().filter(|t| !t.is_heading()) {
        sqlx::query("INSERT INTO tracks (title, duration, album_id) VALUES (?, ?, ?)")
            .bind(&track.title)
            .bind(track.duration.as_deref().unwrap_or(""))
            .bind(album_id)
            .execute(&mut *tx)
            .await?;
        stored_tracks += 1;
    }

    tx.commit().await?;

    tracing::info!(album_id, title = %album.title, tracks = stored_tracks, "Saved album");
    Ok(SavedAlbum { album_id, artist_id })
}

pub async fn get_album(pool: &SqlitePool, id: i64) -> Result<Option<Album>> {
    let album = sqlx::query_as::<_, Album>(
        r#"
        SELECT id, title, year, genres, styles, discogs_id, image_url, artist_id
        FROM albums
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(album)
}

/// All albums with their artist, in insertion order
pub async fn list_album_grid(pool: &SqlitePool) -> Result<Vec<AlbumGridRow>> {
    let rows = sqlx::query_as::<_, AlbumGridRow>(
        r#"
        SELECT al.id, al.title, al.year, al.genres, al.styles, al.image_url,
               al.discogs_id, al.artist_id, ar.name AS artist_name
        FROM albums al
        LEFT JOIN artists ar ON ar.id = al.artist_id
        WHERE al.deleted_at IS NULL
        ORDER BY al.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_albums_by_artist(pool: &SqlitePool, artist_id: i64) -> Result<Vec<Album>> {
    let albums = sqlx::query_as::<_, Album>(
        r#"
        SELECT id, title, year, genres, styles, discogs_id, image_url, artist_id
        FROM albums
        WHERE artist_id = ? AND deleted_at IS NULL
        ORDER BY year, id
        "#,
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(albums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::db::tracks::tracks_for_album;

    fn new_album(title: &str) -> NewAlbum {
        NewAlbum {
            title: title.to_string(),
            year: "1999".to_string(),
            discogs_id: Some(1000),
            genres: "Rock, Pop".to_string(),
            styles: "Alternative".to_string(),
            image_url: "http://img/1.jpg".to_string(),
        }
    }

    fn artist(id: i64, name: &str) -> CatalogArtist {
        CatalogArtist {
            id: Some(id),
            name: name.to_string(),
            thumbnail_url: None,
        }
    }

    #[tokio::test]
    async fn test_save_album_stores_tracks_without_headings() {
        let pool = test_pool().await;
        let tracklist = vec![
            TracklistEntry {
                entry_type: Some("heading".to_string()),
                ..TracklistEntry::new("Side A", "")
            },
            TracklistEntry::new("One", "3:45"),
            TracklistEntry {
                duration: None,
                ..TracklistEntry::new("Two", "")
            },
        ];

        let saved = save_album(&pool, &new_album("Test Album"), &[artist(7, "Band")], &tracklist)
            .await
            .unwrap();

        let tracks = tracks_for_album(&pool, saved.album_id).await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].duration.as_deref(), Some("3:45"));
        assert!(tracks[1].is_missing_duration());

        let album = get_album(&pool, saved.album_id).await.unwrap().unwrap();
        assert_eq!(album.artist_id, saved.artist_id);
        assert_eq!(album.discogs_id, Some(1000));
    }

    #[tokio::test]
    async fn test_save_album_first_artist_owns_and_artists_are_reused() {
        let pool = test_pool().await;
        let artists = vec![artist(1, "Lead"), artist(2, "Guest")];

        let first = save_album(&pool, &new_album("First"), &artists, &[]).await.unwrap();
        let second = save_album(&pool, &new_album("Second"), &artists[1..], &[]).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_ne!(first.artist_id, second.artist_id);
        assert_eq!(list_albums_by_artist(&pool, first.artist_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_album_requires_an_artist() {
        let pool = test_pool().await;

        let result = save_album(&pool, &new_album("Orphan"), &[], &[]).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(list_album_grid(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_album_grid_includes_artist_name() {
        let pool = test_pool().await;
        save_album(&pool, &new_album("Grid"), &[artist(3, "Grid Artist")], &[])
            .await
            .unwrap();

        let rows = list_album_grid(&pool).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].artist_name.as_deref(), Some("Grid Artist"));
        assert_eq!(rows[0].title.as_deref(), Some("Grid"));
    }
}
