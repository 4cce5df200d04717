//! Authentication adapters.
//!
//! Implementations of the `AdminAuthenticator` port:
//!
//! - `static_key` - Shared back-office API key from configuration

mod static_key;

pub use static_key::StaticKeyAuthenticator;
