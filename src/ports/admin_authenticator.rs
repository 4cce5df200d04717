//! AdminAuthenticator port - Gate for back-office HTTP endpoints.

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned when a caller cannot be authenticated as an admin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Port for validating admin credentials presented over HTTP.
#[async_trait]
pub trait AdminAuthenticator: Send + Sync {
    /// Validate a bearer credential.
    async fn authenticate(&self, bearer: &str) -> Result<(), AuthError>;
}
