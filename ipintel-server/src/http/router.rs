use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{client_ip, client_isp, full_record, invalidate};
use super::state::AppState;

/// Invalidation bodies are a single small JSON object.
const MAX_BODY_SIZE: usize = 4 * 1024;

/// Build the router.
///
/// `/ip`, `/isp` and `/invalidate` are method-specific; every other path
/// serves the full record on `GET`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ip", get(client_ip))
        .route("/isp", get(client_isp))
        .route("/invalidate", post(invalidate))
        .fallback(full_record)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
