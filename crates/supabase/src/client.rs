//! HTTP client for the Supabase REST API (PostgREST).
//!
//! Every request carries the project's anon key as `apikey`. The
//! `Authorization` header carries the caller's access token when there is
//! one, and the anon key otherwise, which is how Supabase identifies an
//! anonymous visitor.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::SupabaseConfig;
use crate::error::{Result, SupabaseError};
use crate::query::Query;

/// Media type asking PostgREST for exactly one row as a JSON object.
const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

/// PostgREST / GoTrue error body. Field names differ between the two.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub(crate) code: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) msg: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) error_description: Option<String>,
}

impl ApiErrorResponse {
    pub(crate) fn into_error(self, status: u16) -> SupabaseError {
        // GoTrue sends numeric codes; PostgREST sends strings like "PGRST301".
        let code = match self.code {
            Some(serde_json::Value::String(code)) => Some(code),
            _ => self.error.clone(),
        };
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| format!("HTTP {}", status));
        SupabaseError::api(status, code, message)
    }
}

/// Turns a non-success response body into an error.
pub(crate) fn error_from_body(status: u16, body: &str) -> SupabaseError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => err.into_error(status),
        Err(_) => SupabaseError::api(
            status,
            None,
            format!(
                "Request failed: {}",
                body.chars().take(200).collect::<String>()
            ),
        ),
    }
}

/// Client for the Supabase REST API.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let client = build_http_client(config.request_timeout)?;
        Ok(Self {
            client,
            rest_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Create headers for a request, authorized as `access_token` or anonymously.
    fn headers(&self, access_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| SupabaseError::config("Invalid anon key format"))?;
        headers.insert("apikey", api_key);

        let bearer = access_token.unwrap_or(&self.anon_key);
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", bearer))
            .map_err(|_| SupabaseError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Reads every row matching `query`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &Query,
        access_token: Option<&str>,
    ) -> Result<Vec<T>> {
        let url = query.url(&self.rest_url);
        debug!("[Supabase] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(access_token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Reads the single row matching `query`, or `None` if nothing matches.
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        query: &Query,
        access_token: Option<&str>,
    ) -> Result<Option<T>> {
        let url = query.url(&self.rest_url);
        debug!("[Supabase] GET {} (single)", url);

        let mut headers = self.headers(access_token)?;
        headers.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT_MEDIA_TYPE));

        let response = self.client.get(&url).headers(headers).send().await?;

        match Self::parse_response(response).await {
            Ok(row) => Ok(Some(row)),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Inserts one row into `table` without reading it back.
    pub async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
        access_token: Option<&str>,
    ) -> Result<()> {
        let url = format!("{}/{}", self.rest_url, table);
        debug!("[Supabase] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(access_token)?)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(error_from_body(status.as_u16(), &body))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("[Supabase] Response ({})", status);

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "[Supabase] Failed to deserialize response. Body: {}, Error: {}",
                body.chars().take(500).collect::<String>(),
                e
            );
            SupabaseError::Json(e)
        })
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(SupabaseError::Http)
}
