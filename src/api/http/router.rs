// src/api/http/router.rs
// HTTP router composition for the proxy gateway.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{generative_ai_handler, liveness_handler, maps_handler};
use crate::state::AppState;

/// Browser origin allowed to call the gateway. `*` opens it up entirely,
/// which is only meant for local development. An origin that is not a valid
/// header value denies all cross-origin requests rather than allowing any.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            tracing::error!(origin, "invalid CORS origin, denying cross-origin requests");
            layer
        }
    }
}

/// Create the router with all endpoints
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/", get(liveness_handler))
        .route("/api/maps", get(maps_handler))
        .route("/api/generative-ai", post(generative_ai_handler))
        .layer(TraceLayer::new_for_http())
        // Hard cap on a whole request; upstream calls already carry their
        // own shorter timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer(cors_origin))
        .with_state(state)
}
