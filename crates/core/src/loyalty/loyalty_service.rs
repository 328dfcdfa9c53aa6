use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};

use super::loyalty_model::{
    normalize_client_code, LoyaltyOverview, LoyaltySignup, LoyaltySignupRequest,
};
use super::loyalty_traits::{LoyaltyRepositoryTrait, LoyaltyServiceTrait, LoyaltySignupSinkTrait};
use crate::errors::{Error, Result};

/// Message returned when no member owns the requested code.
pub const LOYALTY_CODE_NOT_FOUND: &str =
    "Loyalty code not found. Check your code or request a new one.";

/// Service for loyalty lookups and signups
pub struct LoyaltyService {
    repository: Arc<dyn LoyaltyRepositoryTrait>,
    signup_sink: Arc<dyn LoyaltySignupSinkTrait>,
}

impl LoyaltyService {
    pub fn new(
        repository: Arc<dyn LoyaltyRepositoryTrait>,
        signup_sink: Arc<dyn LoyaltySignupSinkTrait>,
    ) -> Self {
        Self {
            repository,
            signup_sink,
        }
    }
}

#[async_trait]
impl LoyaltyServiceTrait for LoyaltyService {
    async fn lookup(&self, client_code: &str) -> Result<LoyaltyOverview> {
        let code = normalize_client_code(client_code)?;
        debug!("[Loyalty] Looking up account {}", code);

        let account = self
            .repository
            .find_by_client_code(&code)
            .await?
            .ok_or_else(|| Error::NotFound(LOYALTY_CODE_NOT_FOUND.to_string()))?;

        // The balance is still worth showing when the history can't be read
        let transactions = match self.repository.list_transactions(&account.id).await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(
                    "[Loyalty] Failed to load transactions for {}: {}",
                    account.id, e
                );
                Vec::new()
            }
        };

        Ok(LoyaltyOverview {
            account,
            transactions,
        })
    }

    async fn sign_up(&self, signup: LoyaltySignup) -> Result<LoyaltySignupRequest> {
        signup.validate()?;

        let request = signup.into_request(Utc::now());
        self.signup_sink.submit_signup(&request).await?;
        info!("[Loyalty] Signup submitted for {}", request.client_code);
        Ok(request)
    }
}
