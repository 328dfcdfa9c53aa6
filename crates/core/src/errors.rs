//! Core error types for the IZI client.
//!
//! This module defines backend-agnostic error types. Transport-specific errors
//! (reqwest, PostgREST, GoTrue) are converted to these types by the
//! `izi-supabase` crate.

use std::fmt;

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Data store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Broad category of a data-store failure.
///
/// The data-store client assigns the kind from HTTP status and backend error
/// codes, so callers never have to inspect message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The access token was rejected (expired, malformed, or revoked).
    AuthExpired,
    /// The backend could not be reached or did not answer in time.
    Network,
    /// The backend answered with a body that does not match the expected shape.
    Decode,
    /// Any other failure.
    Unknown,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StoreErrorKind::AuthExpired => "auth-expired",
            StoreErrorKind::Network => "network",
            StoreErrorKind::Decode => "decode",
            StoreErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Substrings that mark an otherwise unclassified failure as an auth failure.
///
/// Matched case-sensitively against the backend message.
pub const AUTH_FAILURE_MARKERS: [&str; 3] = ["JWT", "expired", "invalid"];

/// A failed read or write against the remote data store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
    /// HTTP status returned by the backend, when there was a response.
    pub status: Option<u16>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::AuthExpired, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unknown, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether a session refresh could fix this failure.
    ///
    /// Structured kinds win. The message heuristic only applies to errors the
    /// client could not classify, so a network failure whose text happens to
    /// contain "invalid" is never retried as an auth failure.
    pub fn is_auth_failure(&self) -> bool {
        match self.kind {
            StoreErrorKind::AuthExpired => true,
            StoreErrorKind::Network | StoreErrorKind::Decode => false,
            StoreErrorKind::Unknown => AUTH_FAILURE_MARKERS
                .iter()
                .any(|marker| self.message.contains(marker)),
        }
    }
}

/// Validation errors for user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    /// Every rule a submitted form failed, in form order.
    #[error("{}", .0.join("; "))]
    Form(Vec<String>),
}

impl ValidationError {
    /// Messages suitable for listing under a form.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationError::Form(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
