//! Loyalty signup delivery over an HTTP webhook.

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;

use izi_core::errors::{Error as CoreError, Result as CoreResult};
use izi_core::loyalty::{LoyaltySignupRequest, LoyaltySignupSinkTrait};

use crate::client::build_http_client;
use crate::config::SupabaseConfig;
use crate::error::{Result, SupabaseError};

/// Posts signup requests as JSON to a configured URL.
#[derive(Debug, Clone)]
pub struct SignupWebhook {
    client: reqwest::Client,
    url: String,
}

impl SignupWebhook {
    /// Create a webhook sink from the configured URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no webhook URL is configured.
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let url = config
            .signup_webhook_url
            .clone()
            .ok_or_else(|| SupabaseError::config("Signup webhook URL is not configured"))?;
        Ok(Self {
            client: build_http_client(config.request_timeout)?,
            url,
        })
    }
}

#[async_trait]
impl LoyaltySignupSinkTrait for SignupWebhook {
    async fn submit_signup(&self, request: &LoyaltySignupRequest) -> CoreResult<()> {
        debug!("[SignupWebhook] POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::Submission(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Submission(format!(
                "Signup webhook returned {}",
                status
            )));
        }
        Ok(())
    }
}
