//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{health::health, predict::predict, upload::upload_page};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",        get(upload_page))
        .route("/predict", post(predict))

        // Probes
        .route("/health",  get(health))

        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
