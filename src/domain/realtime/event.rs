//! Wire events exchanged with browser sessions.
//!
//! Every frame, in both directions, is a JSON object:
//!
//! ```json
//! { "type": "visit", "payload": "" }
//! ```
//!
//! The tag is parsed into the closed [`EventType`] enum so dispatch can be
//! matched exhaustively. Payloads stay opaque JSON; only the handlers that
//! need structure (admin auth, visitor counts) decode them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::room::RoomFilter;

/// Every event kind the live layer consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum EventType {
    /// A storefront page opened a live connection.
    VisitStart,
    /// The visitor navigated to another page.
    ViewIncrement,
    /// A dashboard connection presents a one-time admin token.
    AdminAuth,
    /// Shop settings (online, operative, banner message) changed.
    SettingsChanged,
    CategoryCreated,
    CategoryRemoved,
    ProductCreated,
    ProductUpdated,
    ProductRemoved,
    /// Orders were created, fulfilled or deleted.
    OrdersChanged,
    /// Customer records were created, updated or deleted.
    CustomersChanged,
    /// Current live visitor count, pushed to the admin room.
    VisitorCountUpdate,
}

impl EventType {
    pub const ALL: [EventType; 12] = [
        EventType::VisitStart,
        EventType::ViewIncrement,
        EventType::AdminAuth,
        EventType::SettingsChanged,
        EventType::CategoryCreated,
        EventType::CategoryRemoved,
        EventType::ProductCreated,
        EventType::ProductUpdated,
        EventType::ProductRemoved,
        EventType::OrdersChanged,
        EventType::CustomersChanged,
        EventType::VisitorCountUpdate,
    ];

    /// The tag used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            EventType::VisitStart => "visit",
            EventType::ViewIncrement => "view",
            EventType::AdminAuth => "authadmin",
            EventType::SettingsChanged => "settingschanged",
            EventType::CategoryCreated => "newcategory",
            EventType::CategoryRemoved => "removecategory",
            EventType::ProductCreated => "newproduct",
            EventType::ProductUpdated => "updateproduct",
            EventType::ProductRemoved => "removeproduct",
            EventType::OrdersChanged => "orderschanged",
            EventType::CustomersChanged => "customerschanged",
            EventType::VisitorCountUpdate => "uadmin",
        }
    }

    /// Broadcast audience for events relayed from back-office mutations.
    ///
    /// Returns `None` for events that are not part of the relay bus.
    pub fn relay_audience(&self) -> Option<RoomFilter> {
        match self {
            EventType::SettingsChanged
            | EventType::CategoryCreated
            | EventType::CategoryRemoved
            | EventType::ProductCreated
            | EventType::ProductUpdated
            | EventType::ProductRemoved => Some(RoomFilter::NonAdmin),
            EventType::OrdersChanged
            | EventType::CustomersChanged
            | EventType::VisitorCountUpdate => Some(RoomFilter::AdminOnly),
            EventType::VisitStart | EventType::ViewIncrement | EventType::AdminAuth => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a frame carries a tag outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type '{0}'")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

impl TryFrom<String> for EventType {
    type Error = UnknownEventType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventType> for &'static str {
    fn from(kind: EventType) -> Self {
        kind.tag()
    }
}

/// Transport-level frame with the tag still unparsed.
///
/// Decoding into a `Frame` is the fatal step; turning a `Frame` into an
/// [`Event`] can fail without closing the connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Frame {
    /// Decodes a text frame.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A typed event, the unit of fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    pub fn new(kind: EventType, payload: serde_json::Value) -> Self {
        Self { kind, payload }
    }

    /// Builds the visitor count update pushed to dashboards.
    pub fn visitor_count(current: usize) -> Self {
        Self::new(
            EventType::VisitorCountUpdate,
            serde_json::json!({ "current": current }),
        )
    }

    /// Encodes the event as a text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl TryFrom<Frame> for Event {
    type Error = UnknownEventType;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: frame.tag.parse()?,
            payload: frame.payload,
        })
    }
}

/// Payload of [`EventType::VisitorCountUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorCount {
    pub current: usize,
}

/// Payload of [`EventType::AdminAuth`].
#[derive(Debug, Clone, Deserialize)]
pub struct AdminAuthPayload {
    pub otp: String,
}
