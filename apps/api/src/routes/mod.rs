pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use crate::apply::form::MAX_CV_BYTES;
use crate::apply::handlers;
use crate::state::AppState;

/// Headroom on top of the CV cap so multipart framing and the text fields
/// never trip the transport limit; oversized CVs are rejected by the file
/// gate with a specific message instead.
const BODY_LIMIT: usize = MAX_CV_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/apply", post(handlers::handle_apply))
        .route("/api/apply/config", get(handlers::handle_widget_config))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
