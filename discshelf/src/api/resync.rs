//! Track duration resync endpoint

use crate::db::tracks::SqliteTrackStore;
use crate::services::DurationReconciler;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use std::sync::atomic::Ordering;
use tracing::{error, info};

/// Response of `POST /api/resync-durations`
#[derive(Debug, Serialize, PartialEq)]
pub struct ResyncResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Clears the running flag on drop
struct RunningGuard<'a>(&'a std::sync::atomic::AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// POST /api/resync-durations
///
/// Runs one reconciliation batch to completion and reports the counts.
/// Only one batch runs at a time; a second request gets 409.
pub async fn resync_durations(State(state): State<AppState>) -> (StatusCode, Json<ResyncResponse>) {
    if state.resync_running.swap(true, Ordering::SeqCst) {
        return (
            StatusCode::CONFLICT,
            Json(ResyncResponse {
                success: false,
                message: "A duration resync is already running".to_string(),
                updated: None,
                total: None,
                error: None,
            }),
        );
    }
    let _guard = RunningGuard(&state.resync_running);

    let store = SqliteTrackStore::new(state.db.clone());
    let reconciler = DurationReconciler::new(
        state.catalog.as_ref(),
        &store,
        state.reconciler_config.clone(),
    );

    match reconciler.run().await {
        Ok(report) if report.total == 0 => (
            StatusCode::OK,
            Json(ResyncResponse {
                success: true,
                message: "No tracks with missing durations found".to_string(),
                updated: Some(0),
                total: None,
                error: None,
            }),
        ),
        Ok(report) => {
            info!(updated = report.updated, total = report.total, "Resync complete");
            (
                StatusCode::OK,
                Json(ResyncResponse {
                    success: true,
                    message: format!("Successfully updated {} track durations", report.updated),
                    updated: Some(report.updated),
                    total: Some(report.total),
                    error: None,
                }),
            )
        }
        Err(e) => {
            error!("Error resyncing durations: {}", e);
            state.record_error(format!("Duration resync failed: {}", e)).await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ResyncResponse {
                    success: false,
                    message: "Failed to resync track durations".to_string(),
                    updated: None,
                    total: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

pub fn resync_routes() -> Router<AppState> {
    Router::new().route("/api/resync-durations", post(resync_durations))
}
