//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::reload::ReloadError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upstream feed failed or delivered unusable data (502)
    #[error("Reload failed: {0}")]
    Reload(#[from] ReloadError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Reload(ReloadError::Reconcile(_)) => (StatusCode::BAD_GATEWAY, "RECONCILE_FAILED"),
            ApiError::Reload(_) => (StatusCode::BAD_GATEWAY, "FETCH_FAILED"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
