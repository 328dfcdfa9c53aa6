use std::sync::Arc;

use async_trait::async_trait;

use izi_core::constants::CONVOYS_TABLE;
use izi_core::convoys::{ConvoyRepositoryTrait, ConvoyRow};
use izi_core::errors::StoreError;
use izi_core::session::Session;

use crate::client::SupabaseClient;
use crate::query::{Direction, Query};

/// Reads convoys as the signed-in user.
pub struct ConvoyRepository {
    client: Arc<SupabaseClient>,
}

impl ConvoyRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn active_query() -> Query {
        Query::table(CONVOYS_TABLE)
            .eq("is_active", true)
            .order("departure_date", Direction::Ascending)
    }
}

#[async_trait]
impl ConvoyRepositoryTrait for ConvoyRepository {
    async fn list_active(&self, session: &Session) -> Result<Vec<ConvoyRow>, StoreError> {
        self.client
            .select(&Self::active_query(), Some(&session.access_token))
            .await
            .map_err(StoreError::from)
    }
}
