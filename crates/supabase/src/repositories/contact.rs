use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use izi_core::constants::CONTACT_MESSAGES_TABLE;
use izi_core::contact::{ContactRepositoryTrait, ContactStatus, NewContactMessage, SupportPriority};
use izi_core::errors::Result;

use crate::client::SupabaseClient;

/// Insert shape of the `contact_messages` table.
#[derive(Debug, Serialize)]
struct ContactMessageRow<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    priority: SupportPriority,
    status: ContactStatus,
}

impl<'a> From<&'a NewContactMessage> for ContactMessageRow<'a> {
    fn from(message: &'a NewContactMessage) -> Self {
        Self {
            name: &message.name,
            email: &message.email,
            subject: &message.subject,
            message: &message.message,
            priority: message.priority,
            status: ContactStatus::Pending,
        }
    }
}

/// Stores support requests anonymously.
pub struct ContactRepository {
    client: Arc<SupabaseClient>,
}

impl ContactRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContactRepositoryTrait for ContactRepository {
    async fn create(&self, message: &NewContactMessage) -> Result<()> {
        let row = ContactMessageRow::from(message);
        self.client
            .insert(CONTACT_MESSAGES_TABLE, &row, None)
            .await?;
        Ok(())
    }
}
