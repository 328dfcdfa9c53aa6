use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::contact_model::NewContactMessage;
use super::contact_traits::{ContactRepositoryTrait, ContactServiceTrait};
use crate::errors::Result;

/// Service for support requests
pub struct ContactService {
    repository: Arc<dyn ContactRepositoryTrait>,
}

impl ContactService {
    pub fn new(repository: Arc<dyn ContactRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ContactServiceTrait for ContactService {
    async fn submit(&self, message: NewContactMessage) -> Result<()> {
        message.validate()?;
        self.repository.create(&message).await?;
        info!("[Contact] Support request stored ({:?})", message.priority);
        Ok(())
    }
}
