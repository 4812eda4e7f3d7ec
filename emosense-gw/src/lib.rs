//! emosense-gw library - API Gateway module
//!
//! Forwards `/api`-prefixed requests to the inference service with the
//! prefix removed, relaying the upstream response verbatim, and attaches
//! permissive CORS headers to every response.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream inference service origin, without a trailing slash
    pub upstream: String,
    /// Client used for the upstream leg of every forwarded request
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state for the given upstream origin
    pub fn new(upstream: String) -> Self {
        Self {
            upstream: upstream.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

/// Build application router
///
/// `/api` and everything under it is forwarded; `/health` is answered
/// locally. CORS headers are applied to all responses, proxied or not.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::any;

    Router::new()
        .route("/api", any(api::proxy::forward))
        .route("/api/*rest", any(api::proxy::forward))
        .merge(api::health::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
