//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::admin::empty_secret;
use super::error::ValidationError;

/// Payment event forwarding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Shared secret the gateway integration sends with forwarded events
    #[serde(default = "empty_secret")]
    pub forward_secret: SecretString,
}

impl PaymentConfig {
    pub fn is_configured(&self) -> bool {
        !self.forward_secret.expose_secret().is_empty()
    }

    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if production && !self.is_configured() {
            return Err(ValidationError::MissingRequired("PAYMENT__FORWARD_SECRET"));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            forward_secret: empty_secret(),
        }
    }
}
