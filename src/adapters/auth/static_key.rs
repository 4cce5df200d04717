//! Static admin key authenticator.
//!
//! The back office presents a shared API key as a bearer credential before
//! it may mint a one-time socket token. The key comes from configuration and
//! is compared in constant time.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::ports::{AdminAuthenticator, AuthError};

/// Accepts exactly one configured key.
pub struct StaticKeyAuthenticator {
    api_key: Secret<String>,
}

impl StaticKeyAuthenticator {
    pub fn new(api_key: Secret<String>) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl AdminAuthenticator for StaticKeyAuthenticator {
    async fn authenticate(&self, bearer: &str) -> Result<(), AuthError> {
        let expected = self.api_key.expose_secret().as_bytes();
        if expected.is_empty() || bearer.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if expected.ct_eq(bearer.as_bytes()).unwrap_u8() != 1 {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator(key: &str) -> StaticKeyAuthenticator {
        StaticKeyAuthenticator::new(Secret::new(key.to_string()))
    }

    #[tokio::test]
    async fn accepts_configured_key() {
        assert!(authenticator("s3cret").authenticate("s3cret").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_wrong_key() {
        assert_eq!(
            authenticator("s3cret").authenticate("s3cre").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn unconfigured_key_rejects_everything() {
        assert_eq!(
            authenticator("").authenticate("").await,
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            authenticator("").authenticate("anything").await,
            Err(AuthError::MissingCredentials)
        );
    }
}
