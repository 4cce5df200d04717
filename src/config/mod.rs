//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ROSSKERY` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use rosskery_live::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod admin;
mod error;
mod orders;
mod payment;
mod realtime;
mod server;

pub use admin::AdminConfig;
pub use error::{ConfigError, ValidationError};
pub use orders::OrdersConfig;
pub use payment::PaymentConfig;
pub use realtime::RealtimeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has working defaults, so an empty environment yields a
/// runnable development setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, allowed origin)
    #[serde(default)]
    pub server: ServerConfig,

    /// Heartbeat, queue and token settings for live connections
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Draft order staging
    #[serde(default)]
    pub orders: OrdersConfig,

    /// Back-office credentials
    #[serde(default)]
    pub admin: AdminConfig,

    /// Payment event forwarding
    #[serde(default)]
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROSSKERY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ROSSKERY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ROSSKERY__REALTIME__PONG_WAIT_SECS=10` -> `realtime.pong_wait_secs = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROSSKERY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Production additionally requires an allowed origin, the admin key and
    /// the payment forwarding secret.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let production = self.is_production();
        self.server.validate()?;
        self.realtime.validate()?;
        self.orders.validate()?;
        self.admin.validate(production)?;
        self.payment.validate(production)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
