//! Rosskery Live - Real-time core of the Rosskery bakery storefront
//!
//! Fans catalog and order updates out to connected browsers, lets the back
//! office join an admin room with a one-time token, counts live visits and
//! stages card orders until the payment provider confirms them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
