use std::time::Duration;

use crate::error::{Result, SupabaseError};

pub const ENV_SUPABASE_URL: &str = "IZI_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "IZI_SUPABASE_ANON_KEY";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "IZI_REQUEST_TIMEOUT_MS";
pub const ENV_SIGNUP_WEBHOOK_URL: &str = "IZI_SIGNUP_WEBHOOK_URL";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Public anon key, sent as `apikey` on every request.
    pub anon_key: String,
    pub request_timeout: Duration,
    /// Where loyalty signups are posted; signups fail when unset.
    pub signup_webhook_url: Option<String>,
}

impl SupabaseConfig {
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            signup_webhook_url: None,
        }
    }

    pub fn with_signup_webhook(mut self, url: &str) -> Self {
        self.signup_webhook_url = Some(url.to_string());
        self
    }

    /// Reads the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    SupabaseError::config(format!("Missing environment variable {}", key))
                })
        };

        let url = required(ENV_SUPABASE_URL)?;
        let anon_key = required(ENV_SUPABASE_ANON_KEY)?;
        let timeout_ms: u64 = lookup(ENV_REQUEST_TIMEOUT_MS)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let signup_webhook_url = lookup(ENV_SIGNUP_WEBHOOK_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            request_timeout: Duration::from_millis(timeout_ms),
            signup_webhook_url,
        })
    }

    /// PostgREST base URL.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// GoTrue base URL.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }
}
