//! API route definitions.

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use http::Method;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, list_models, synthesize_speech};
use crate::state::AppState;

/// Builds the API router. State is attached by the caller.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/v1/models", get(list_models))
        // Accepts POST with a JSON body and GET with query parameters.
        .route("/v1/audio/speech", any(synthesize_speech))
        .layer(TraceLayer::new_for_http())
}

/// Permissive CORS for browser clients, applied outside the router so
/// preflight requests short-circuit before routing.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
