//! Route modules for the OCR server

pub mod health;
pub mod ocr;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::state::AppState;

/// Build the application router
///
/// Tracing and CORS layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config().upload.max_bytes);

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/ocr", ocr::router())
        .layer(body_limit)
        .with_state(state)
}
