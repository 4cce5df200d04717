//! Broadcast partitions.

use serde::Serialize;
use std::fmt;

/// The room a connection belongs to.
///
/// Every connection starts in `Base`; a verified admin token moves it to
/// `Admin`. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    #[default]
    Base,
    Admin,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Base => f.write_str("base"),
            Room::Admin => f.write_str("admin"),
        }
    }
}

/// Which connections a broadcast reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomFilter {
    /// Back-office dashboards only.
    AdminOnly,
    /// Storefront sessions only.
    NonAdmin,
    All,
}

impl RoomFilter {
    pub fn matches(&self, room: Room) -> bool {
        match self {
            RoomFilter::AdminOnly => room == Room::Admin,
            RoomFilter::NonAdmin => room != Room::Admin,
            RoomFilter::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_connections_start_in_base() {
        assert_eq!(Room::default(), Room::Base);
    }

    #[test]
    fn filters_match_expected_rooms() {
        assert!(RoomFilter::AdminOnly.matches(Room::Admin));
        assert!(!RoomFilter::AdminOnly.matches(Room::Base));
        assert!(RoomFilter::NonAdmin.matches(Room::Base));
        assert!(!RoomFilter::NonAdmin.matches(Room::Admin));
        assert!(RoomFilter::All.matches(Room::Base));
        assert!(RoomFilter::All.matches(Room::Admin));
    }
}
