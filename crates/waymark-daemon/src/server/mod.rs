//! HTTP surface: capture page, ingestion endpoint, and admin views.

mod ingest;
mod views;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::storage::LocationStore;
use crate::tunnel::TunnelState;

/// Shared application state threaded through axum handlers.
///
/// Both members are constructor-injected; handlers never reach for process
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocationStore>,
    pub tunnel: Arc<TunnelState>,
}

/// Build the application router.
///
/// Routes mount only the methods they support, so an unsupported method
/// yields 405 with no side effects.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(views::capture_page))
        .route("/location", post(ingest::submit_location))
        .route("/admin", get(views::admin_panel))
        .route("/admin/data", get(views::data_dump))
        .route("/admin/clear", post(views::clear_data))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
#[path = "handler_tests.rs"]
mod tests;
