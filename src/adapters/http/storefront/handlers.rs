//! HTTP handlers for the storefront and back-office endpoints.
//!
//! These handlers connect Axum routes to the live services and the ordering
//! command handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::websocket::HubHandle;
use crate::application::{
    CheckoutOutcome, HandlePaymentConfirmationCommand, HandlePaymentConfirmationHandler,
    LiveServices, SubmitCheckoutCommand, SubmitCheckoutHandler,
};
use crate::domain::auth::TokenIssuer;
use crate::domain::foundation::CartSessionId;
use crate::domain::ordering::OrderStagingCache;
use crate::ports::{AdminAuthenticator, CartStore, PaymentEventVerifier};

use crate::adapters::http::error::ApiError;
use super::dto::{CheckoutRequest, CheckoutResponse, HealthResponse, PaymentWebhookResponse};

/// Header carrying the shopper's cart session.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Header carrying the payment forwarding secret.
pub const PAYMENT_SIGNATURE_HEADER: &str = "Payment-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the storefront endpoints.
///
/// Cloned for each request; every dependency is behind an `Arc` or a handle.
#[derive(Clone)]
pub struct StorefrontAppState {
    pub hub: HubHandle,
    pub tokens: Arc<TokenIssuer>,
    pub admin_auth: Arc<dyn AdminAuthenticator>,
    pub carts: Arc<dyn CartStore>,
    pub payments: Arc<dyn PaymentEventVerifier>,
    pub staging: Arc<OrderStagingCache>,
}

impl StorefrontAppState {
    pub fn from_services(services: &LiveServices) -> Self {
        Self {
            hub: services.hub.clone(),
            tokens: services.tokens.clone(),
            admin_auth: services.admin_auth.clone(),
            carts: services.carts.clone(),
            payments: services.payments.clone(),
            staging: services.staging.clone(),
        }
    }

    pub fn checkout_handler(&self) -> SubmitCheckoutHandler {
        SubmitCheckoutHandler::new(self.carts.clone(), self.staging.clone())
    }

    pub fn payment_handler(&self) -> HandlePaymentConfirmationHandler {
        HandlePaymentConfirmationHandler::new(self.payments.clone(), self.staging.clone())
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /admin/token - Mint a one-time token for the admin socket
pub async fn issue_admin_token(
    State(state): State<StorefrontAppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let bearer = header(&headers, AUTHORIZATION.as_str())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default();

    state.admin_auth.authenticate(bearer).await?;

    let token = state.tokens.issue();
    tracing::info!("Admin token issued");
    Ok(Json(token))
}

/// POST /orders - Submit the checkout form for a cart session
pub async fn submit_checkout(
    State(state): State<StorefrontAppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_session =
        header(&headers, SESSION_HEADER).ok_or(ApiError::MissingHeader(SESSION_HEADER))?;
    let session_id = CartSessionId::new(raw_session)?;

    let cmd = SubmitCheckoutCommand {
        session_id,
        contact: request.contact,
        pickup_time: request.pickup_time,
        method: request.method,
    };
    let outcome = state.checkout_handler().handle(cmd).await?;

    let status = match outcome {
        CheckoutOutcome::Created(_) => StatusCode::CREATED,
        CheckoutOutcome::AwaitingPayment => StatusCode::ACCEPTED,
    };
    Ok((status, Json(CheckoutResponse::from(&outcome))))
}

/// POST /webhooks/payment - Payment provider event forwarded by the gateway
pub async fn handle_payment_webhook(
    State(state): State<StorefrontAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = header(&headers, PAYMENT_SIGNATURE_HEADER)
        .ok_or(ApiError::MissingHeader(PAYMENT_SIGNATURE_HEADER))?;

    let cmd = HandlePaymentConfirmationCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };
    let result = state.payment_handler().handle(cmd).await?;

    Ok(Json(PaymentWebhookResponse::from(&result)))
}

/// GET /healthcheck
pub async fn healthcheck(State(state): State<StorefrontAppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        clients: state.hub.client_count().await,
    })
}
