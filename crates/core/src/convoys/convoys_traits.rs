//! Convoy repository trait.

use async_trait::async_trait;

use super::convoys_model::ConvoyRow;
use crate::errors::StoreError;
use crate::session::Session;

/// Read access to the `convoys` table.
///
/// Errors are returned as [`StoreError`] so the feed can tell a rejected
/// token from any other failure without parsing messages.
#[async_trait]
pub trait ConvoyRepositoryTrait: Send + Sync {
    /// Lists rows with `is_active = true`, ordered by departure date ascending.
    async fn list_active(&self, session: &Session) -> Result<Vec<ConvoyRow>, StoreError>;
}
