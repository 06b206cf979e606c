//! Dashboard routes

use axum::{
    extract::State,
    response::{Html, Redirect},
};

use crate::render::render_index;
use crate::AppState;

/// GET /
///
/// Renders the currently published findings
pub async fn serve_index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.current().await;
    Html(render_index(&snapshot, state.reloader.days()))
}

/// GET /refresh
///
/// Reloads both feeds, then redirects to the dashboard. A failed reload is
/// shown there as a banner above the previous findings.
pub async fn refresh(State(state): State<AppState>) -> Redirect {
    // Failure is already recorded on the snapshot
    let _ = state.reloader.reload().await;
    Redirect::temporary("/")
}
