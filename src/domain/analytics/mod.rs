//! Visitor analytics: live visits and their aggregation.

mod aggregator;
mod visit;

pub use aggregator::{ArchiveOutcome, VisitAggregator};
pub use visit::{Visit, VisitRecord};
