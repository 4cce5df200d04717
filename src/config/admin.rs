//! Back-office credentials

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Back-office API key used to mint admin socket tokens
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Shared bearer key for `POST /admin/token`
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,
}

impl AdminConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }

    /// Validate admin configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if production && !self.is_configured() {
            return Err(ValidationError::MissingRequired("ADMIN__API_KEY"));
        }
        Ok(())
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
        }
    }
}

pub(super) fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}
