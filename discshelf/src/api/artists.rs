//! Artist endpoints

use crate::db::{albums, artists};
use crate::library::{group_artists_by_letter, ArtistGroup};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use discshelf_common::db::Album;

/// GET /api/artists
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Json<Vec<ArtistGroup>>> {
    let artists = artists::list_artists(&state.db).await?;
    Ok(Json(group_artists_by_letter(artists)))
}

/// GET /api/artists/:id/albums
pub async fn list_artist_albums(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Album>>> {
    if artists::get_artist(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Artist {} not found", id)));
    }

    let albums = albums::list_albums_by_artist(&state.db, id).await?;
    Ok(Json(albums))
}

pub fn artist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/artists", get(list_artists))
        .route("/api/artists/:id/albums", get(list_artist_albums))
}
