pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;
use crate::upload::handlers;

/// Room for the text fields and multipart framing on top of the file itself.
const FORM_OVERHEAD_BYTES: u64 = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = (state.config.max_upload_bytes + FORM_OVERHEAD_BYTES) as usize;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes/analyze",
            post(handlers::handle_analyze).layer(
                ServiceBuilder::new()
                    .layer(RequestBodyLimitLayer::new(body_limit))
                    .layer(DefaultBodyLimit::disable()),
            ),
        )
        .route("/api/v1/resumes/:id", get(handlers::handle_get_resume))
        .with_state(state)
}
