//! One-time tokens that let a socket join the admin room.
//!
//! The back office fetches a token over authenticated HTTP, then sends it on
//! its WebSocket as an `authadmin` event. A token verifies at most once and
//! only within its TTL; a background sweep drops the ones nobody used.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5);

/// Default period of the expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// A freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct AdminToken {
    #[serde(rename = "otp")]
    pub key: String,
    #[serde(skip)]
    pub issued_at: Instant,
}

/// Issues and verifies single-use admin tokens.
pub struct TokenIssuer {
    tokens: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new token and remember when it was issued.
    pub fn issue(&self) -> AdminToken {
        let key = Uuid::new_v4().simple().to_string();
        let issued_at = Instant::now();
        self.tokens().insert(key.clone(), issued_at);
        tracing::debug!("Admin token issued");

        AdminToken { key, issued_at }
    }

    /// Consume a token.
    ///
    /// Returns `true` only for a known token younger than the TTL. The token
    /// is removed whatever the outcome, so a second call always fails.
    pub fn verify(&self, key: &str) -> bool {
        let issued_at = self.tokens().remove(key);
        match issued_at {
            Some(issued_at) => issued_at.elapsed() < self.ttl,
            None => false,
        }
    }

    /// Drop expired tokens. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut tokens = self.tokens();
        let before = tokens.len();
        tokens.retain(|_, issued_at| now.duration_since(*issued_at) < self.ttl);
        before - tokens.len()
    }

    /// Number of tokens currently held.
    pub fn outstanding(&self) -> usize {
        self.tokens().len()
    }

    /// Sweep every `interval` until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run_sweeper(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        tracing::info!(interval_ms = interval.as_millis() as u64, "Token sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "Expired admin tokens swept");
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        tracing::info!("Token sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL)
    }
}
