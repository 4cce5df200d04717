//! In-Memory Visit Archive Adapter
//!
//! Keeps archived visits in a vector. Useful for development and tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::analytics::VisitRecord;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::VisitArchive;

/// In-memory archive of completed visits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVisitArchive {
    records: Arc<RwLock<Vec<VisitRecord>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryVisitArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `archive` call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All archived visits, oldest first.
    pub async fn records(&self) -> Vec<VisitRecord> {
        self.records.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl VisitArchive for InMemoryVisitArchive {
    async fn archive(&self, record: &VisitRecord) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "visit archive unavailable",
            ));
        }
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
