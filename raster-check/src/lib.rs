//! raster-check library - schedule reconciliation dashboard
//!
//! Fetches the website calendar and the automation schedule, reconciles
//! them with `raster-common` and serves the findings as HTML and JSON.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod feeds;
pub mod reload;
pub mod render;
pub mod state;

use reload::Reloader;
use state::SnapshotStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Currently published findings
    pub store: SnapshotStore,
    /// Pipeline behind `/refresh` and `/api/reload`
    pub reloader: Arc<Reloader>,
}

impl AppState {
    /// Create new application state; `reloader` must publish into `store`
    pub fn new(store: SnapshotStore, reloader: Arc<Reloader>) -> Self {
        Self { store, reloader }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/refresh", get(api::refresh))
        .route("/api/findings", get(api::get_findings))
        .route("/api/reload", post(api::post_reload))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
