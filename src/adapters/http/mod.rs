//! HTTP adapters - the full axum application.
//!
//! [`app_router`] mounts the WebSocket upgrade next to the storefront API
//! and applies the request-level layers (tracing, CORS, timeout). The
//! timeout only wraps the API routes; a socket outlives its upgrade request.

pub mod error;
pub mod storefront;

use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::application::LiveServices;
use crate::config::ServerConfig;

pub use error::{ApiError, ErrorResponse};
pub use storefront::{storefront_router, StorefrontAppState};

/// Build the complete application router.
pub fn app_router(services: &LiveServices, server: &ServerConfig) -> Router {
    let ws_state = WebSocketState::new(
        services.hub.clone(),
        services.router.clone(),
        services.settings,
        server.allowed_origin.as_str(),
    );

    let api = storefront_router()
        .with_state(StorefrontAppState::from_services(services))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(cors_layer(&server.allowed_origin));

    Router::new()
        .merge(websocket_router().with_state(ws_state))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}

/// CORS for the storefront origin. Without one configured, no cross-origin
/// caller is allowed.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-session-id"),
        ]);

    if allowed_origin.is_empty() {
        return layer;
    }
    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = allowed_origin, "Allowed origin is not a valid header value");
            layer
        }
    }
}
