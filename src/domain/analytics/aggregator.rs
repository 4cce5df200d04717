//! In-memory registry of live visits.
//!
//! Counting views in memory avoids a database round-trip on every page
//! change; each visit is written out once, when its connection closes.
//!
//! # Locking
//!
//! One mutex guards the map. Critical sections are map operations only:
//! archival snapshots the visit under the lock, persists with the lock
//! released, then re-locks to remove the entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::VisitArchive;

use super::visit::Visit;

/// What happened to a visit handed to [`VisitAggregator::archive_visit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Persisted and removed from memory.
    Archived,
    /// Persistence failed; the visit was removed anyway and is lost.
    Dropped,
    /// No live visit with that id (never started, or already archived).
    NotFound,
}

struct Entry {
    visit: Visit,
    /// Set once archival has started, so a second archive call is a no-op.
    archiving: bool,
}

/// Concurrent registry of in-progress visits.
pub struct VisitAggregator {
    visits: Mutex<HashMap<ClientId, Entry>>,
    archive: Arc<dyn VisitArchive>,
}

impl VisitAggregator {
    pub fn new(archive: Arc<dyn VisitArchive>) -> Self {
        Self {
            visits: Mutex::new(HashMap::new()),
            archive,
        }
    }

    fn visits(&self) -> MutexGuard<'_, HashMap<ClientId, Entry>> {
        self.visits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking a visit.
    ///
    /// Returns `false` if a visit with the same id is already live; the
    /// existing visit (and its view count) is kept.
    pub fn add_visit(&self, visit: Visit) -> bool {
        let mut visits = self.visits();
        if visits.contains_key(&visit.id) {
            return false;
        }
        visits.insert(
            visit.id,
            Entry {
                visit,
                archiving: false,
            },
        );
        true
    }

    /// Count one more page view. Returns `false` for unknown ids.
    pub fn increment_views(&self, id: &ClientId) -> bool {
        let mut visits = self.visits();
        match visits.get_mut(id) {
            Some(entry) => {
                entry.visit.views = entry.visit.views.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Persist the visit and forget it.
    pub async fn archive_visit(&self, id: &ClientId) -> ArchiveOutcome {
        let record = {
            let mut visits = self.visits();
            let Some(entry) = visits.get_mut(id).filter(|entry| !entry.archiving) else {
                return ArchiveOutcome::NotFound;
            };
            entry.archiving = true;
            entry.visit.finish(Timestamp::now())
        };

        let outcome = match self.archive.archive(&record).await {
            Ok(()) => {
                tracing::debug!(visit_id = %id, views = record.views, "Visit archived");
                ArchiveOutcome::Archived
            }
            Err(e) => {
                tracing::error!(visit_id = %id, error = %e, "Failed to archive visit, dropping it");
                ArchiveOutcome::Dropped
            }
        };

        self.visits().remove(id);
        outcome
    }

    /// Number of live visits, excluding those already being archived.
    pub fn current_count(&self) -> usize {
        self.visits()
            .values()
            .filter(|entry| !entry.archiving)
            .count()
    }

    /// Copy of one live visit.
    pub fn get(&self, id: &ClientId) -> Option<Visit> {
        self.visits().get(id).map(|entry| entry.visit.clone())
    }
}
