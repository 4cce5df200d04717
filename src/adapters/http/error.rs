//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the conversion into a
//! response is the only place status codes are chosen.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::PaymentConfirmationError;
use crate::domain::foundation::ValidationError;
use crate::domain::ordering::OrderError;
use crate::ports::{AuthError, PaymentVerificationError};

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    MissingHeader(&'static str),
    Validation(ValidationError),
    Order(OrderError),
    Payment(PaymentVerificationError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self::Order(err)
    }
}

impl From<PaymentConfirmationError> for ApiError {
    fn from(err: PaymentConfirmationError) -> Self {
        match err {
            PaymentConfirmationError::Verification(e) => Self::Payment(e),
            PaymentConfirmationError::Order(e) => Self::Order(e),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::MissingHeader(_) => (StatusCode::BAD_REQUEST, "MISSING_HEADER"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::Order(e) => {
                let status = match e {
                    _ if e.is_client_error() => StatusCode::BAD_REQUEST,
                    OrderError::CartUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code())
            }
            ApiError::Payment(PaymentVerificationError::InvalidSignature) => {
                (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
            }
            ApiError::Payment(PaymentVerificationError::Malformed(_)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_EVENT")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Auth(e) => e.to_string(),
            ApiError::MissingHeader(name) => format!("Missing {} header", name),
            ApiError::Validation(e) => e.to_string(),
            ApiError::Order(e) => e.to_string(),
            ApiError::Payment(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        } else {
            tracing::debug!(code, error = %message, "Request rejected");
        }

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
