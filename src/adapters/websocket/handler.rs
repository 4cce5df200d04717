//! WebSocket upgrade handler for storefront and dashboard connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the socket to the
//! connection loops:
//! 1. Check the request origin
//! 2. Capture referrer, user agent and remote address for the visit
//! 3. Upgrade to WebSocket with the configured message size limit
//! 4. Register with the hub and run the read/write loops

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        connect_info::ConnectInfo,
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        State,
    },
    http::{
        header::{ORIGIN, REFERER, USER_AGENT},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::domain::foundation::ClientId;

use super::client::{serve_connection, ConnectionSettings};
use super::hub::HubHandle;
use super::router::{ConnectionInfo, EventRouter};

/// User agent marker of the native dashboard app, which sends no Origin.
const NATIVE_APP_AGENT: &str = "Dart";

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: HubHandle,
    pub router: EventRouter,
    pub settings: ConnectionSettings,
    /// Exact `Origin` value browsers must present.
    pub allowed_origin: Arc<str>,
}

impl WebSocketState {
    pub fn new(
        hub: HubHandle,
        router: EventRouter,
        settings: ConnectionSettings,
        allowed_origin: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            hub,
            router,
            settings,
            allowed_origin: allowed_origin.into(),
        }
    }
}

/// Whether the upgrade request comes from somewhere we serve.
///
/// A missing `Origin` is accepted from the native dashboard app; otherwise
/// it is compared like an empty origin.
pub fn origin_allowed(headers: &HeaderMap, allowed_origin: &str) -> bool {
    let origin = header_str(headers, ORIGIN.as_str());
    if origin.is_empty() && header_str(headers, USER_AGENT.as_str()).contains(NATIVE_APP_AGENT) {
        return true;
    }
    origin == allowed_origin
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    headers: HeaderMap,
    remote: Option<ConnectInfo<SocketAddr>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !origin_allowed(&headers, &state.allowed_origin) {
        tracing::info!(
            origin = header_str(&headers, ORIGIN.as_str()),
            "Origin not allowed"
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let conn = ConnectionInfo {
        client_id: ClientId::new(),
        ip: remote
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default(),
        referrer: header_str(&headers, REFERER.as_str()).to_string(),
        user_agent: header_str(&headers, USER_AGENT.as_str()).to_string(),
    };

    let WebSocketState {
        hub,
        router,
        settings,
        ..
    } = state;

    ws.max_message_size(settings.max_message_bytes)
        .on_upgrade(move |socket| serve_connection(socket, conn, hub, router, settings))
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new().route("/ws", get(ws_handler))
}
