pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::outreach::handlers as outreach;
use crate::state::AppState;

/// Uploaded PDFs routinely exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction
        .route("/api/v1/categories", get(extraction::handle_categories))
        .route("/api/v1/extract", post(extraction::handle_extract))
        .route("/api/v1/filter", post(extraction::handle_filter))
        .route("/api/v1/export", post(extraction::handle_export))
        // Outreach
        .route("/api/v1/outreach/targets", post(outreach::handle_targets))
        .route("/api/v1/outreach/letter", post(outreach::handle_letter))
        .route("/api/v1/outreach/send", post(outreach::handle_send))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
