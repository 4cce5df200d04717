//! Real-time vocabulary: wire events and broadcast rooms.

mod event;
mod room;

pub use event::{AdminAuthPayload, Event, EventType, Frame, UnknownEventType, VisitorCount};
pub use room::{Room, RoomFilter};
