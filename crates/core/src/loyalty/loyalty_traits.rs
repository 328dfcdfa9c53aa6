//! Loyalty repository, signup sink, and service traits.

use async_trait::async_trait;

use super::loyalty_model::{
    LoyaltyAccount, LoyaltyOverview, LoyaltySignup, LoyaltySignupRequest, LoyaltyTransaction,
};
use crate::errors::Result;

/// Read access to loyalty members and their point history.
#[async_trait]
pub trait LoyaltyRepositoryTrait: Send + Sync {
    /// Looks up the member owning `client_code` (already normalised).
    ///
    /// Returns `Ok(None)` when no member has that code.
    async fn find_by_client_code(&self, client_code: &str) -> Result<Option<LoyaltyAccount>>;

    /// Lists a member's transactions, most recent first.
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<LoyaltyTransaction>>;
}

/// Destination of loyalty signup requests.
#[async_trait]
pub trait LoyaltySignupSinkTrait: Send + Sync {
    async fn submit_signup(&self, request: &LoyaltySignupRequest) -> Result<()>;
}

/// Loyalty operations offered to views.
#[async_trait]
pub trait LoyaltyServiceTrait: Send + Sync {
    /// Finds an account by the code a customer typed, with its history.
    async fn lookup(&self, client_code: &str) -> Result<LoyaltyOverview>;

    /// Validates and submits a signup, returning what was sent.
    async fn sign_up(&self, signup: LoyaltySignup) -> Result<LoyaltySignupRequest>;
}
