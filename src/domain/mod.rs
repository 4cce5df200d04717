//! Domain layer containing the storefront's live-state logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `realtime` - Wire events, event types and broadcast rooms
//! - `analytics` - Live visits and the visit aggregator
//! - `auth` - One-time admin tokens
//! - `ordering` - Draft orders and the order staging cache

pub mod analytics;
pub mod auth;
pub mod foundation;
pub mod ordering;
pub mod realtime;
