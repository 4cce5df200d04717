//! Axum router configuration for the storefront endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    handle_payment_webhook, healthcheck, issue_admin_token, submit_checkout, StorefrontAppState,
};

/// Create the storefront API router.
///
/// # Routes
///
/// - `POST /admin/token` - Mint a one-time admin socket token (bearer key)
/// - `POST /orders` - Submit checkout for the `X-Session-Id` cart
/// - `POST /webhooks/payment` - Forwarded payment provider events
/// - `GET /healthcheck` - Liveness and connected client count
pub fn storefront_router() -> Router<StorefrontAppState> {
    Router::new()
        .route("/admin/token", post(issue_admin_token))
        .route("/orders", post(submit_checkout))
        .route("/webhooks/payment", post(handle_payment_webhook))
        .route("/healthcheck", get(healthcheck))
}
