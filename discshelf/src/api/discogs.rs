//! Discogs pass-through endpoints used by the album search UI
//!
//! Upstream status and body are returned as-is.

use crate::services::CatalogError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MasterParams {
    pub id: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn passthrough(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(body)).into_response()
}

fn catalog_failure(err: CatalogError, fallback: &str) -> Response {
    if matches!(err, CatalogError::MissingToken) {
        return error_response(StatusCode::UNAUTHORIZED, &err.to_string());
    }
    error!("{}: {}", fallback, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, fallback)
}

/// GET /api/discogs/search?q=&page=
pub async fn search_masters(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = match params.q.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => q,
        None => return error_response(StatusCode::BAD_REQUEST, "Query parameter required"),
    };
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);

    match state.discogs.search_masters_raw(query, page).await {
        Ok((status, body)) => passthrough(status, body),
        Err(e) => catalog_failure(e, "Failed to search"),
    }
}

/// GET /api/discogs/master?id=
pub async fn get_master(
    State(state): State<AppState>,
    Query(params): Query<MasterParams>,
) -> Response {
    let id = match params.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => return error_response(StatusCode::BAD_REQUEST, "ID parameter required"),
    };
    let id = match id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "ID parameter must be numeric"),
    };

    match state.discogs.master_raw(id).await {
        Ok((status, body)) => passthrough(status, body),
        Err(e) => catalog_failure(e, "Failed to fetch master"),
    }
}

pub fn discogs_routes() -> Router<AppState> {
    Router::new()
        .route("/api/discogs/search", get(search_masters))
        .route("/api/discogs/master", get(get_master))
}
