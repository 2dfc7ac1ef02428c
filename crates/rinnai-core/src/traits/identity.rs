//! Identity provider trait.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ProviderError;
use crate::tokens::{AccessToken, RefreshToken, SessionTokens, TokenSet};
use crate::Credentials;

/// The managed identity provider accounts authenticate against.
///
/// Implementations perform network calls; callers bound every call with the
/// configured executor timeout.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate with the account password.
    async fn authenticate(&self, credentials: &Credentials) -> Result<TokenSet, ProviderError>;

    /// Obtain a fresh id/access token pair with the refresh token.
    async fn renew(
        &self,
        access_token: &AccessToken,
        refresh_token: &RefreshToken,
    ) -> Result<SessionTokens, ProviderError>;

    /// Returns true if the access token is outside its validity window.
    ///
    /// The default checks the known expiry locally without a round trip.
    async fn is_stale(&self, tokens: &SessionTokens) -> Result<bool, ProviderError> {
        Ok(tokens.is_expired_at(Utc::now()))
    }
}
