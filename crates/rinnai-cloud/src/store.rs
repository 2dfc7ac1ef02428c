//! Shared credential storage.

use tokio::sync::RwLock;
use tracing::debug;

use rinnai_core::{RefreshToken, SessionCredentials, SessionTokens};

/// Holds the identity and session tokens of one client.
///
/// Every mutation replaces the record under a single write lock, so readers
/// see either the old or the new credential set and never a mix of both.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<SessionCredentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the stored credentials.
    pub async fn get(&self) -> SessionCredentials {
        self.inner.read().await.clone()
    }

    /// Replace the id/access tokens.
    ///
    /// The stored refresh token is kept when `refresh_token` is `None`.
    pub async fn set(&self, tokens: SessionTokens, refresh_token: Option<RefreshToken>) {
        let mut creds = self.inner.write().await;
        creds.tokens = Some(tokens);
        if let Some(refresh_token) = refresh_token {
            creds.refresh_token = Some(refresh_token);
        }
        debug!("Stored session tokens");
    }

    /// Replace the whole record with a new identity and token set.
    pub async fn establish(
        &self,
        identity: impl Into<String>,
        tokens: SessionTokens,
        refresh_token: RefreshToken,
    ) {
        let mut creds = self.inner.write().await;
        *creds = SessionCredentials {
            identity: Some(identity.into()),
            tokens: Some(tokens),
            refresh_token: Some(refresh_token),
        };
    }

    /// Forget the identity and all tokens.
    pub async fn clear(&self) {
        *self.inner.write().await = SessionCredentials::default();
    }

    pub async fn identity(&self) -> Option<String> {
        self.inner.read().await.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rinnai_core::{AccessToken, IdToken};

    fn tokens(id: &str, access: &str) -> SessionTokens {
        SessionTokens::new(IdToken::new(id), AccessToken::new(access))
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = CredentialStore::new();
        store
            .set(tokens("id-1", "access-1"), Some(RefreshToken::new("refresh-1")))
            .await;

        let creds = store.get().await;
        assert_eq!(creds.id_token().map(IdToken::as_str), Some("id-1"));
        assert_eq!(creds.access_token().map(AccessToken::as_str), Some("access-1"));
        assert_eq!(
            creds.refresh_token.as_ref().map(RefreshToken::as_str),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn set_without_refresh_token_keeps_previous() {
        let store = CredentialStore::new();
        store
            .set(tokens("id-1", "access-1"), Some(RefreshToken::new("refresh-1")))
            .await;
        store.set(tokens("id-2", "access-2"), None).await;

        let creds = store.get().await;
        assert_eq!(creds.id_token().map(IdToken::as_str), Some("id-2"));
        assert_eq!(
            creds.refresh_token.as_ref().map(RefreshToken::as_str),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn clear_forgets_everything() {
        let store = CredentialStore::new();
        store
            .establish(
                "user@example.com",
                tokens("id", "access"),
                RefreshToken::new("refresh"),
            )
            .await;
        assert_eq!(store.identity().await.as_deref(), Some("user@example.com"));

        store.clear().await;
        let creds = store.get().await;
        assert!(!creds.is_authenticated());
        assert!(creds.identity.is_none());
        assert!(creds.refresh_token.is_none());
    }
}
