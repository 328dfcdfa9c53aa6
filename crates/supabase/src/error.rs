//! Error types for the Supabase backend crate.

use izi_core::errors::{Error as CoreError, StoreError, StoreErrorKind};
use thiserror::Error;

/// Result type alias for Supabase operations.
pub type Result<T> = std::result::Result<T, SupabaseError>;

/// PostgREST codes for a rejected JWT (expired, malformed, missing claims).
const JWT_ERROR_CODES: [&str; 3] = ["PGRST301", "PGRST302", "PGRST303"];

/// PostgREST code for `.single()` matching no row.
pub(crate) const NO_ROWS_CODE: &str = "PGRST116";

/// Errors that can occur while talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from PostgREST or GoTrue
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Authentication error (missing or malformed token)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SupabaseError {
    /// Create an API error from status, optional backend code and message
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classifies the failure for retry decisions.
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            SupabaseError::Http(e) if e.is_decode() => StoreErrorKind::Decode,
            SupabaseError::Json(_) => StoreErrorKind::Decode,
            SupabaseError::Http(_) => StoreErrorKind::Network,
            SupabaseError::Api { status: 401, .. } => StoreErrorKind::AuthExpired,
            SupabaseError::Api {
                code: Some(code), ..
            } if JWT_ERROR_CODES.contains(&code.as_str()) => StoreErrorKind::AuthExpired,
            SupabaseError::Auth(_) => StoreErrorKind::AuthExpired,
            _ => StoreErrorKind::Unknown,
        }
    }

    /// Whether this is PostgREST reporting that a single-row read matched nothing.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, SupabaseError::Api { code: Some(code), .. } if code == NO_ROWS_CODE)
    }

    /// The backend's own message, without this crate's prefixes.
    pub fn message(&self) -> String {
        match self {
            SupabaseError::Api { message, .. } => message.clone(),
            SupabaseError::Auth(message) | SupabaseError::Config(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        let store_error = StoreError::new(err.kind(), err.message());
        match err {
            SupabaseError::Api { status, .. } => store_error.with_status(status),
            _ => store_error,
        }
    }
}

impl From<SupabaseError> for CoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Config(message) => CoreError::Unexpected(message),
            other => CoreError::Store(StoreError::from(other)),
        }
    }
}
