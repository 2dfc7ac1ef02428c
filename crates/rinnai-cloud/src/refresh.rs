//! Single-flight token validity checks and renewal.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use rinnai_core::{
    CloudError, Error, IdentityProvider, ProviderError, RefreshToken, Result, SessionTokens,
};

use crate::store::CredentialStore;

/// Keeps the stored tokens fresh.
///
/// All checks and renewals run under one refresh lock, separate from any
/// request limit. The staleness check happens while the lock is held, so a
/// caller that waited on a renewal observes the renewed tokens and returns.
/// Session changes ([`establish`](Self::establish), [`clear`](Self::clear))
/// take the same lock, so an in-flight renewal can never write its tokens
/// over a newer session.
pub struct TokenRefreshCoordinator {
    store: Arc<CredentialStore>,
    provider: Arc<dyn IdentityProvider>,
    executor_timeout: Duration,
    refresh_lock: Mutex<()>,
}

impl TokenRefreshCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        provider: Arc<dyn IdentityProvider>,
        executor_timeout: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            executor_timeout,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Renew the tokens if the access token is stale.
    ///
    /// Does nothing when no access or refresh token is stored.
    ///
    /// # Errors
    ///
    /// Returns the mapped provider error if renewal fails, or
    /// [`Error::Timeout`] if a provider call exceeds the executor timeout. The
    /// stored credentials are left untouched in both cases.
    #[instrument(skip(self))]
    pub async fn ensure_valid(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        let creds = self.store.get().await;
        let (Some(tokens), Some(refresh_token)) = (creds.tokens, creds.refresh_token) else {
            debug!("No session tokens, skipping validity check");
            return Ok(());
        };

        let stale = bounded(
            self.executor_timeout,
            "check_token",
            self.provider.is_stale(&tokens),
        )
        .await?;
        if !stale {
            return Ok(());
        }

        info!("Access token is stale, renewing");
        self.renew_with(&tokens, &refresh_token).await
    }

    /// Renew the tokens unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Unauthenticated`] when there is nothing to renew,
    /// otherwise the same errors as [`TokenRefreshCoordinator::ensure_valid`].
    #[instrument(skip(self))]
    pub async fn renew(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        let creds = self.store.get().await;
        let (Some(tokens), Some(refresh_token)) = (creds.tokens, creds.refresh_token) else {
            return Err(CloudError::Unauthenticated {
                message: "No authentication tokens available".to_string(),
            }
            .into());
        };

        self.renew_with(&tokens, &refresh_token).await
    }

    /// Replace the session with a new identity and token set.
    ///
    /// Waits for any in-flight renewal to finish first.
    pub async fn establish(
        &self,
        identity: &str,
        tokens: SessionTokens,
        refresh_token: RefreshToken,
    ) {
        let _guard = self.refresh_lock.lock().await;
        self.store.establish(identity, tokens, refresh_token).await;
    }

    /// Forget the session, after any in-flight renewal has finished.
    pub async fn clear(&self) {
        let _guard = self.refresh_lock.lock().await;
        self.store.clear().await;
    }

    async fn renew_with(
        &self,
        tokens: &SessionTokens,
        refresh_token: &RefreshToken,
    ) -> Result<()> {
        let renewed = bounded(
            self.executor_timeout,
            "renew_access_token",
            self.provider.renew(tokens.access_token(), refresh_token),
        )
        .await;

        match renewed {
            Ok(new_tokens) => {
                self.store.set(new_tokens, None).await;
                debug!("Access token renewed");
                Ok(())
            }
            Err(err) if err.requires_login() => {
                error!(error = %err, "Unable to refresh token");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "Token renewal failed");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TokenRefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefreshCoordinator")
            .field("executor_timeout", &self.executor_timeout)
            .finish_non_exhaustive()
    }
}

/// Bound an identity-provider call by the executor timeout.
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(Error::from),
        Err(_) => Err(Error::Timeout {
            operation: operation.to_string(),
            duration_ms: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rinnai_core::{AccessToken, Credentials, ErrorKind, IdToken, TokenSet};

    /// Treats every access token except "fresh-access" as stale.
    struct MockProvider {
        renewals: AtomicUsize,
        renew_delay: Duration,
        fail_with: Option<&'static str>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                renewals: AtomicUsize::new(0),
                renew_delay: Duration::ZERO,
                fail_with: None,
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockProvider {
        async fn authenticate(
            &self,
            _credentials: &Credentials,
        ) -> std::result::Result<TokenSet, ProviderError> {
            unreachable!("not used by the coordinator")
        }

        async fn renew(
            &self,
            _access_token: &AccessToken,
            _refresh_token: &RefreshToken,
        ) -> std::result::Result<SessionTokens, ProviderError> {
            self.renewals.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.renew_delay).await;
            match self.fail_with {
                Some(code) => Err(ProviderError::Service {
                    code: code.to_string(),
                    message: "Refresh Token has expired".to_string(),
                }),
                None => Ok(SessionTokens::new(
                    IdToken::new("fresh-id"),
                    AccessToken::new("fresh-access"),
                )),
            }
        }

        async fn is_stale(&self, tokens: &SessionTokens) -> std::result::Result<bool, ProviderError> {
            Ok(tokens.access_token().as_str() != "fresh-access")
        }
    }

    async fn stale_store() -> Arc<CredentialStore> {
        let store = Arc::new(CredentialStore::new());
        store
            .establish(
                "user@example.com",
                SessionTokens::new(IdToken::new("old-id"), AccessToken::new("old-access")),
                RefreshToken::new("refresh"),
            )
            .await;
        store
    }

    #[tokio::test]
    async fn empty_store_is_left_alone() {
        let provider = Arc::new(MockProvider::new());
        let coordinator = TokenRefreshCoordinator::new(
            Arc::new(CredentialStore::new()),
            provider.clone(),
            Duration::from_secs(1),
        );

        coordinator.ensure_valid().await.unwrap();
        assert_eq!(provider.renewals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_token_is_renewed_and_refresh_token_kept() {
        let store = stale_store().await;
        let provider = Arc::new(MockProvider::new());
        let coordinator =
            TokenRefreshCoordinator::new(store.clone(), provider.clone(), Duration::from_secs(1));

        coordinator.ensure_valid().await.unwrap();

        let creds = store.get().await;
        assert_eq!(creds.id_token().map(IdToken::as_str), Some("fresh-id"));
        assert_eq!(
            creds.refresh_token.as_ref().map(RefreshToken::as_str),
            Some("refresh")
        );
        assert_eq!(provider.renewals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_renew_once() {
        let store = stale_store().await;
        let provider = Arc::new(MockProvider {
            renew_delay: Duration::from_millis(50),
            ..MockProvider::new()
        });
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            store.clone(),
            provider.clone(),
            Duration::from_secs(5),
        ));

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.ensure_valid().await }
        });
        let second = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.ensure_valid().await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(provider.renewals.load(Ordering::SeqCst), 1);
        let creds = store.get().await;
        assert_eq!(creds.id_token().map(IdToken::as_str), Some("fresh-id"));
        assert_eq!(creds.access_token().map(AccessToken::as_str), Some("fresh-access"));
    }

    #[tokio::test]
    async fn rejected_renewal_keeps_stale_credentials() {
        let store = stale_store().await;
        let provider = Arc::new(MockProvider {
            fail_with: Some("NotAuthorizedException"),
            ..MockProvider::new()
        });
        let coordinator =
            TokenRefreshCoordinator::new(store.clone(), provider, Duration::from_secs(1));

        let err = coordinator.ensure_valid().await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unauthenticated));

        let creds = store.get().await;
        assert_eq!(creds.id_token().map(IdToken::as_str), Some("old-id"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_renewal_times_out() {
        let store = stale_store().await;
        let provider = Arc::new(MockProvider {
            renew_delay: Duration::from_secs(60),
            ..MockProvider::new()
        });
        let coordinator =
            TokenRefreshCoordinator::new(store.clone(), provider, Duration::from_secs(2));

        let err = coordinator.renew().await.unwrap_err();
        assert!(matches!(err, Error::Timeout { duration_ms: 2000, .. }));

        let creds = store.get().await;
        assert_eq!(creds.access_token().map(AccessToken::as_str), Some("old-access"));
    }

    #[tokio::test(start_paused = true)]
    async fn establish_waits_for_inflight_renewal() {
        let store = stale_store().await;
        let provider = Arc::new(MockProvider {
            renew_delay: Duration::from_millis(200),
            ..MockProvider::new()
        });
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            store.clone(),
            provider,
            Duration::from_secs(5),
        ));

        let renewal = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.renew().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        coordinator
            .establish(
                "other@example.com",
                SessionTokens::new(IdToken::new("other-id"), AccessToken::new("other-access")),
                RefreshToken::new("other-refresh"),
            )
            .await;
        renewal.await.unwrap().unwrap();

        let creds = store.get().await;
        assert_eq!(creds.identity.as_deref(), Some("other@example.com"));
        assert_eq!(creds.id_token().map(IdToken::as_str), Some("other-id"));
        assert_eq!(
            creds.refresh_token.as_ref().map(RefreshToken::as_str),
            Some("other-refresh")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn clear_waits_for_inflight_renewal() {
        let store = stale_store().await;
        let provider = Arc::new(MockProvider {
            renew_delay: Duration::from_millis(200),
            ..MockProvider::new()
        });
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            store.clone(),
            provider,
            Duration::from_secs(5),
        ));

        let renewal = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.renew().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        coordinator.clear().await;
        renewal.await.unwrap().unwrap();

        let creds = store.get().await;
        assert!(creds.identity.is_none());
        assert!(creds.tokens.is_none());
        assert!(creds.refresh_token.is_none());
    }

    #[tokio::test]
    async fn explicit_renew_without_session_is_unauthenticated() {
        let coordinator = TokenRefreshCoordinator::new(
            Arc::new(CredentialStore::new()),
            Arc::new(MockProvider::new()),
            Duration::from_secs(1),
        );

        let err = coordinator.renew().await.unwrap_err();
        assert!(err.requires_login());
    }
}
