//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Request ID → 3. Access log → 4. Timeout → 5. Body limit

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::Settings;

/// Headroom on top of the image ceiling for multipart framing and other parts.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the service router from settings.
pub fn quality_router(settings: Settings) -> Router {
    build_router(ApiContext::new(settings))
}

/// Build the router from a pre-constructed `ApiContext`.
pub fn build_router(ctx: ApiContext) -> Router {
    let body_limit = ctx.settings.thresholds.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;
    let timeout = Duration::from_secs(ctx.settings.request_timeout_secs);

    // Layers are applied from bottom (innermost) to top (outermost).
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/version", get(endpoints::version::show))
        .route("/quality", post(endpoints::quality::assess))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(ctx)
        .layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        .layer(axum::middleware::from_fn(
            middleware::request_id::assign_request_id,
        ))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
