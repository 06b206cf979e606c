//! JSON access to the published findings

use std::sync::Arc;

use axum::{extract::State, Json};
use raster_common::{FindingsList, LocalTime};
use serde::Serialize;

use crate::api::ApiError;
use crate::state::{ReloadFailure, Snapshot};
use crate::AppState;

/// Published snapshot as JSON; `findings` shares the snapshot's list
#[derive(Debug, Serialize)]
pub struct FindingsResponse {
    pub generated_at: Option<LocalTime>,
    pub days: u32,
    pub grid_size: usize,
    pub count: usize,
    pub last_error: Option<ReloadFailure>,
    pub findings: Arc<FindingsList>,
}

impl FindingsResponse {
    fn from_snapshot(snapshot: &Snapshot, days: u32) -> Self {
        Self {
            generated_at: snapshot.generated_at,
            days,
            grid_size: snapshot.grid_size,
            count: snapshot.findings.len(),
            last_error: snapshot.last_error.clone(),
            findings: Arc::clone(&snapshot.findings),
        }
    }
}

/// GET /api/findings
pub async fn get_findings(State(state): State<AppState>) -> Json<FindingsResponse> {
    let snapshot = state.store.current().await;
    Json(FindingsResponse::from_snapshot(&snapshot, state.reloader.days()))
}

/// POST /api/reload
///
/// Runs the full pipeline; on failure the previous findings stay published
/// and the error is returned with 502.
pub async fn post_reload(State(state): State<AppState>) -> Result<Json<FindingsResponse>, ApiError> {
    let snapshot = state.reloader.reload().await?;
    Ok(Json(FindingsResponse::from_snapshot(&snapshot, state.reloader.days())))
}
