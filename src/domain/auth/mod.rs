//! Admin privilege escalation for live connections.

mod token_issuer;

pub use token_issuer::{AdminToken, TokenIssuer, DEFAULT_SWEEP_INTERVAL, DEFAULT_TOKEN_TTL};
