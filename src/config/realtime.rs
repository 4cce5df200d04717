//! Live connection configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// WebSocket heartbeat, queue and token settings
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Seconds to wait for a pong before dropping a connection
    #[serde(default = "default_pong_wait")]
    pub pong_wait_secs: u64,

    /// Capacity of each client's outbound queue
    #[serde(default = "default_queue_capacity")]
    pub outbound_queue_capacity: usize,

    /// Largest inbound WebSocket message, in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Lifetime of a one-time admin token, in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Period of the expired-token sweep, in seconds
    #[serde(default = "default_token_sweep_interval")]
    pub token_sweep_interval_secs: u64,
}

impl RealtimeConfig {
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    /// Pings go out at 9/10 of the pong wait.
    pub fn ping_interval(&self) -> Duration {
        self.pong_wait() * 9 / 10
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn token_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.token_sweep_interval_secs)
    }

    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pong_wait_secs == 0 {
            return Err(ValidationError::ZeroValue("REALTIME__PONG_WAIT_SECS"));
        }
        if self.ping_interval().is_zero() || self.ping_interval() >= self.pong_wait() {
            return Err(ValidationError::InvalidHeartbeat);
        }
        if self.outbound_queue_capacity == 0 {
            return Err(ValidationError::ZeroValue("REALTIME__OUTBOUND_QUEUE_CAPACITY"));
        }
        if self.max_message_bytes == 0 {
            return Err(ValidationError::ZeroValue("REALTIME__MAX_MESSAGE_BYTES"));
        }
        if self.token_ttl_secs == 0 {
            return Err(ValidationError::ZeroValue("REALTIME__TOKEN_TTL_SECS"));
        }
        if self.token_sweep_interval_secs == 0 {
            return Err(ValidationError::ZeroValue("REALTIME__TOKEN_SWEEP_INTERVAL_SECS"));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            pong_wait_secs: default_pong_wait(),
            outbound_queue_capacity: default_queue_capacity(),
            max_message_bytes: default_max_message_bytes(),
            token_ttl_secs: default_token_ttl(),
            token_sweep_interval_secs: default_token_sweep_interval(),
        }
    }
}

fn default_pong_wait() -> u64 {
    10
}

fn default_queue_capacity() -> usize {
    4096
}

fn default_max_message_bytes() -> usize {
    4096
}

fn default_token_ttl() -> u64 {
    5
}

fn default_token_sweep_interval() -> u64 {
    1
}
