//! Payment provider adapters.
//!
//! Implementations of the `PaymentEventVerifier` port:
//!
//! - `forwarded_events` - Events relayed by the gateway integration with a
//!   shared forwarding secret

mod forwarded_events;

pub use forwarded_events::ForwardedPaymentEvents;
