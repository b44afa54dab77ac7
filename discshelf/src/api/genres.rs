//! Genre shelves

use crate::db::albums;
use crate::library::{group_albums_by_genre, GenreGroup};
use crate::{ApiResult, AppState};
use axum::{extract::State, routing::get, Json, Router};

/// GET /api/genres
pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<GenreGroup>>> {
    let rows = albums::list_album_grid(&state.db).await?;
    Ok(Json(group_albums_by_genre(rows)))
}

pub fn genre_routes() -> Router<AppState> {
    Router::new().route("/api/genres", get(list_genres))
}
