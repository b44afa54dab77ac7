//! Settings API endpoint
//!
//! `GET/POST /api/settings` for the Discogs token. The database is
//! authoritative; the live client picks up the new token immediately and the
//! TOML file is updated best-effort.

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub discogs_api_token: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Response {
    match crate::db::settings::get_discogs_api_token(&state.db).await {
        Ok(token) => Json(SettingsResponse {
            discogs_api_token: token.unwrap_or_default(),
        })
        .into_response(),
        Err(e) => {
            error!("Error fetching settings: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch settings")
        }
    }
}

/// POST /api/settings
///
/// **Request:** `{"discogsApiToken": "..."}`. Any non-string value is
/// rejected with 400; an empty string clears the token.
pub async fn save_settings(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let token = match body.get("discogsApiToken") {
        Some(Value::String(token)) => token.clone(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Invalid discogs API token"),
    };

    if let Err(e) = crate::db::settings::set_discogs_api_token(&state.db, &token).await {
        error!("Error saving settings: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save settings");
    }

    state.discogs.set_token(Some(token.clone())).await;
    info!("Discogs token updated via settings");

    if let Some(path) = &state.config_path {
        crate::config::sync_token_to_toml(&token, path);
    }

    Json(json!({ "success": true })).into_response()
}

pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).post(save_settings))
}
