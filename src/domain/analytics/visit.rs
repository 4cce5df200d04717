//! A single storefront visit, tracked while its connection is live.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClientId, Timestamp};

/// In-progress visit, keyed by the owning connection's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: ClientId,
    /// Remote address of the connection.
    pub ip: String,
    pub views: u32,
    /// Referrer header captured at upgrade time.
    pub referrer: String,
    pub user_agent: String,
    pub started_at: Timestamp,
}

impl Visit {
    pub fn start(
        id: ClientId,
        ip: impl Into<String>,
        referrer: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            id,
            ip: ip.into(),
            views: 0,
            referrer: referrer.into(),
            user_agent: user_agent.into(),
            started_at: Timestamp::now(),
        }
    }

    /// Freezes the visit into the record handed to durable storage.
    pub fn finish(&self, ended_at: Timestamp) -> VisitRecord {
        let duration_ms = ended_at
            .duration_since(&self.started_at)
            .num_milliseconds()
            .max(0) as u64;

        VisitRecord {
            id: self.id,
            ip: self.ip.clone(),
            views: self.views,
            duration_ms,
            referrer: self.referrer.clone(),
            user_agent: self.user_agent.clone(),
            started_at: self.started_at,
        }
    }
}

/// Completed visit as persisted on disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: ClientId,
    pub ip: String,
    pub views: u32,
    pub duration_ms: u64,
    pub referrer: String,
    pub user_agent: String,
    pub started_at: Timestamp,
}
