//! Album endpoints: import and browse

use crate::db::{albums, artists, tracks};
use crate::library::{filter_and_sort, AlbumQuery};
use crate::services::album_import::{import_album, ImportAlbumRequest, ImportedAlbum};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use discshelf_common::db::{Album, Artist, Track};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AlbumDetail {
    pub album: Album,
    pub artist: Option<Artist>,
    pub tracks: Vec<Track>,
}

/// POST /api/album
///
/// **Request:** a Discogs master record plus optional `selectedImageUrl`.
/// **Response:** `{"album": {...}, "albumId": 42}`
pub async fn create_album(
    State(state): State<AppState>,
    Json(request): Json<ImportAlbumRequest>,
) -> ApiResult<Json<ImportedAlbum>> {
    let imported = import_album(&state.db, state.catalog.as_ref(), request).await?;
    Ok(Json(imported))
}

/// GET /api/albums?q=&sort=album|artist&order=asc|desc
pub async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<AlbumQuery>,
) -> ApiResult<Json<Vec<albums::AlbumGridRow>>> {
    let rows = albums::list_album_grid(&state.db).await?;
    Ok(Json(filter_and_sort(rows, &query)))
}

/// GET /api/albums/:id
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AlbumDetail>> {
    let album = albums::get_album(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Album {} not found", id)))?;
    let artist = artists::get_artist(&state.db, album.artist_id).await?;
    let tracks = tracks::tracks_for_album(&state.db, id).await?;

    Ok(Json(AlbumDetail {
        album,
        artist,
        tracks,
    }))
}

pub fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/api/album", post(create_album))
        .route("/api/albums", get(list_albums))
        .route("/api/albums/:id", get(get_album))
}
