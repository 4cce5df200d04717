//! Order staging configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// How long unpaid drafts live and how often they are swept
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersConfig {
    /// Seconds before an unconfirmed draft is abandoned
    #[serde(default = "default_draft_ttl")]
    pub draft_ttl_secs: u64,

    /// Period of the abandonment sweep, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl OrdersConfig {
    pub fn draft_ttl(&self) -> Duration {
        Duration::from_secs(self.draft_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate order staging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.draft_ttl_secs == 0 {
            return Err(ValidationError::ZeroValue("ORDERS__DRAFT_TTL_SECS"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::ZeroValue("ORDERS__SWEEP_INTERVAL_SECS"));
        }
        Ok(())
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            draft_ttl_secs: default_draft_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_draft_ttl() -> u64 {
    30 * 60
}

fn default_sweep_interval() -> u64 {
    60
}
