//! CartStore port - Per-session shopping carts.

use async_trait::async_trait;

use crate::domain::foundation::{CartSessionId, DomainError};
use crate::domain::ordering::LineItem;

/// Port for reading and clearing a session's cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Current cart lines, priced. Empty when the session has no cart.
    async fn line_items(&self, session_id: &CartSessionId) -> Result<Vec<LineItem>, DomainError>;

    /// Remove every line from the session's cart.
    async fn clear(&self, session_id: &CartSessionId) -> Result<(), DomainError>;
}
