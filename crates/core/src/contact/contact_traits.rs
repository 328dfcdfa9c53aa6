//! Contact repository and service traits.

use async_trait::async_trait;

use super::contact_model::NewContactMessage;
use crate::errors::Result;

/// Persistence of support requests.
#[async_trait]
pub trait ContactRepositoryTrait: Send + Sync {
    async fn create(&self, message: &NewContactMessage) -> Result<()>;
}

#[async_trait]
pub trait ContactServiceTrait: Send + Sync {
    /// Validates and stores a support request.
    async fn submit(&self, message: NewContactMessage) -> Result<()>;
}
