//! Session provider backed by Supabase Auth (GoTrue).
//!
//! Holds the signed-in session in memory and exchanges its refresh token for
//! a new access token when asked.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, error, info};
use reqwest::header::CONTENT_TYPE;

use izi_core::errors::{Error as CoreError, Result as CoreResult};
use izi_core::session::{Session, SessionProviderTrait};

use crate::client::{build_http_client, error_from_body};
use crate::config::SupabaseConfig;
use crate::error::{Result, SupabaseError};

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + ChronoDuration::seconds(secs))
            });

        let session = Session::new(self.access_token).with_refresh_token(self.refresh_token);
        match expires_at {
            Some(expires_at) => session.with_expiry(expires_at),
            None => session,
        }
    }
}

/// Supabase Auth session provider.
#[derive(Debug)]
pub struct SupabaseAuth {
    client: reqwest::Client,
    auth_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl SupabaseAuth {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.request_timeout)?,
            auth_url: config.auth_url(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
        })
    }

    /// Installs a session obtained at sign-in.
    pub fn set_session(&self, session: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Forgets the current session (sign-out).
    pub fn clear_session(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Exchanges a refresh token for a new session.
    ///
    /// POST /auth/v1/token?grant_type=refresh_token
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Session> {
        let token_url = format!("{}/token?grant_type=refresh_token", self.auth_url);
        debug!("[SupabaseAuth] Refreshing access token from: {}", token_url);

        let response = self
            .client
            .post(&token_url)
            .header("apikey", &self.anon_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            error!("[SupabaseAuth] Token refresh failed: {}", err);
            return Err(err);
        }

        let token_response: TokenResponse = serde_json::from_str(&body)?;
        debug!("[SupabaseAuth] Access token refreshed successfully");
        Ok(token_response.into_session(Utc::now()))
    }

    fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
    }
}

#[async_trait]
impl SessionProviderTrait for SupabaseAuth {
    fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn refresh_session(&self) -> CoreResult<Session> {
        let refresh_token = self.refresh_token().ok_or_else(|| {
            CoreError::Session("No refresh token available. Please sign in first.".to_string())
        })?;

        let session = self
            .exchange_refresh_token(&refresh_token)
            .await
            .map_err(|e: SupabaseError| CoreError::Session(e.message()))?;

        info!("[SupabaseAuth] Session refreshed");
        self.set_session(session.clone());
        Ok(session)
    }
}
