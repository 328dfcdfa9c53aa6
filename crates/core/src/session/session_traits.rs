//! Session provider trait.

use async_trait::async_trait;

use super::session_model::Session;
use crate::errors::Result;

/// Source of the current access token.
///
/// Implementations own the session; consumers only read it and ask for a
/// refresh when the backend rejects the token.
#[async_trait]
pub trait SessionProviderTrait: Send + Sync {
    /// Returns a snapshot of the current session, if any.
    fn current_session(&self) -> Option<Session>;

    /// Obtains a new access token and replaces the current session.
    ///
    /// Resolves once the new token is stored, or fails if the provider could
    /// not refresh (no refresh token, rejected by the auth server).
    async fn refresh_session(&self) -> Result<Session>;
}
