//! HTTP API handlers for raster-check

pub mod error;
pub mod findings;
pub mod health;
pub mod ui;

pub use error::ApiError;
pub use findings::{get_findings, post_reload};
pub use health::health_routes;
pub use ui::{refresh, serve_index};
