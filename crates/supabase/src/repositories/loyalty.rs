use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use izi_core::constants::{LOYALTY_TRANSACTIONS_TABLE, USERS_TABLE};
use izi_core::errors::Result;
use izi_core::loyalty::{
    LoyaltyAccount, LoyaltyRepositoryTrait, LoyaltyTransaction, TransactionType,
};

use crate::client::SupabaseClient;
use crate::query::{Direction, Query};

/// Row shape of the `users` table.
#[derive(Debug, Deserialize)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    phone: String,
    client_code: String,
    #[serde(default)]
    loyalty_points: i64,
    created_at: String,
}

impl From<UserRow> for LoyaltyAccount {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            client_code: row.client_code,
            loyalty_points: row.loyalty_points,
            created_at: row.created_at,
        }
    }
}

/// Row shape of the `loyalty_transactions` table.
#[derive(Debug, Deserialize)]
struct LoyaltyTransactionRow {
    id: String,
    points: i64,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    description: String,
    created_at: String,
}

impl From<LoyaltyTransactionRow> for LoyaltyTransaction {
    fn from(row: LoyaltyTransactionRow) -> Self {
        Self {
            id: row.id,
            points: row.points,
            transaction_type: row.transaction_type,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Reads loyalty members anonymously; lookups are keyed by client code.
pub struct LoyaltyRepository {
    client: Arc<SupabaseClient>,
}

impl LoyaltyRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LoyaltyRepositoryTrait for LoyaltyRepository {
    async fn find_by_client_code(&self, client_code: &str) -> Result<Option<LoyaltyAccount>> {
        let query = Query::table(USERS_TABLE).eq("client_code", client_code);
        let row: Option<UserRow> = self.client.select_single(&query, None).await?;
        Ok(row.map(LoyaltyAccount::from))
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<LoyaltyTransaction>> {
        let query = Query::table(LOYALTY_TRANSACTIONS_TABLE)
            .eq("user_id", user_id)
            .order("created_at", Direction::Descending);
        let rows: Vec<LoyaltyTransactionRow> = self.client.select(&query, None).await?;
        Ok(rows.into_iter().map(LoyaltyTransaction::from).collect())
    }
}
