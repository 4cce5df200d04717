//! VisitArchive port - Durable storage for completed visits.
//!
//! The aggregator keeps live visits in memory and hands each one to this
//! port exactly once, when its connection closes.

use async_trait::async_trait;

use crate::domain::analytics::VisitRecord;
use crate::domain::foundation::DomainError;

/// Port for persisting completed visits.
///
/// Called outside any lock; implementations may perform I/O freely.
#[async_trait]
pub trait VisitArchive: Send + Sync {
    /// Persist one completed visit.
    async fn archive(&self, record: &VisitRecord) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn VisitArchive) {}
}
