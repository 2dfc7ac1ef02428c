//! The Control-R cloud client.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, instrument};

use rinnai_core::{
    ClientConfig, Credentials, HttpTransport, IdentityProvider, RefreshToken, Result,
    SessionCredentials, SessionTokens,
};

use crate::cognito::CognitoIdentityProvider;
use crate::endpoints::{DeviceApi, UserApi};
use crate::pipeline::{AuthenticatedRequestPipeline, TransportFactory};
use crate::refresh::{TokenRefreshCoordinator, bounded};
use crate::store::CredentialStore;

/// An authenticated connection to the Control-R cloud.
///
/// Clients are cheap to clone (they share an internal `Arc`) and safe to use
/// from many tasks at once. Token renewal is coordinated internally.
///
/// # Example
///
/// ```no_run
/// use rinnai_cloud::Client;
/// use rinnai_core::{DeviceRef, TemperatureUnit};
///
/// # async fn example() -> Result<(), rinnai_core::Error> {
/// let client = Client::new()?;
/// client.login("user@example.com", "password").await?;
///
/// let device = DeviceRef::new("rinnai-thing-123")?;
/// if let Some(api) = client.device() {
///     let response = api
///         .set_temperature(&device, 120.0, TemperatureUnit::Fahrenheit)
///         .await?;
///     println!("accepted: {}", response.success);
/// }
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    store: Arc<CredentialStore>,
    provider: Arc<dyn IdentityProvider>,
    coordinator: Arc<TokenRefreshCoordinator>,
    pipeline: Arc<AuthenticatedRequestPipeline>,
    device: OnceLock<DeviceApi>,
    user: OnceLock<UserApi>,
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    provider: Option<Arc<dyn IdentityProvider>>,
    transport: Option<Arc<dyn HttpTransport>>,
    transport_factory: Option<TransportFactory>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom identity provider instead of Cognito.
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Send requests through a caller-owned transport. The client never
    /// closes it.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace how the client creates the transport it owns.
    pub fn transport_factory(mut self, factory: TransportFactory) -> Self {
        self.transport_factory = Some(factory);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the default
    /// identity provider cannot be created.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;

        let provider: Arc<dyn IdentityProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(CognitoIdentityProvider::new(
                self.config.identity_pool.clone(),
            )?),
        };

        let store = Arc::new(CredentialStore::new());
        let coordinator = Arc::new(TokenRefreshCoordinator::new(
            store.clone(),
            provider.clone(),
            self.config.executor_timeout,
        ));

        let mut pipeline = AuthenticatedRequestPipeline::new(
            &self.config,
            store.clone(),
            coordinator.clone(),
            self.transport,
        );
        if let Some(factory) = self.transport_factory {
            pipeline = pipeline.with_transport_factory(factory);
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: self.config,
                store,
                provider,
                coordinator,
                pipeline: Arc::new(pipeline),
                device: OnceLock::new(),
                user: OnceLock::new(),
            }),
        })
    }
}

impl Client {
    /// Create a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default identity provider cannot be created.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Authenticate with the account password.
    ///
    /// # Errors
    ///
    /// Returns the mapped provider error (for example
    /// [`rinnai_core::CloudError::Unauthenticated`] for a wrong password), or
    /// [`rinnai_core::Error::Timeout`] if the provider does not answer in time.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identity: &str, password: &str) -> Result<()> {
        info!("Logging in");

        let credentials = Credentials::new(identity, password);
        let token_set = bounded(
            self.inner.config.executor_timeout,
            "login",
            self.inner.provider.authenticate(&credentials),
        )
        .await?;

        self.inner
            .coordinator
            .establish(identity, token_set.tokens, token_set.refresh_token)
            .await;
        self.init_endpoints();

        debug!("Logged in");
        Ok(())
    }

    /// Restore a persisted session without re-authenticating.
    ///
    /// The tokens are renewed on the next request if they turn out stale.
    #[instrument(skip(self, tokens, refresh_token))]
    pub async fn restore(&self, identity: &str, tokens: SessionTokens, refresh_token: RefreshToken) {
        self.inner
            .coordinator
            .establish(identity, tokens, refresh_token)
            .await;
        self.init_endpoints();
        debug!("Session restored");
    }

    /// Forget the identity and all tokens.
    ///
    /// A renewal in flight finishes first and cannot bring its tokens back.
    pub async fn logout(&self) {
        self.inner.coordinator.clear().await;
        info!("Logged out");
    }

    /// Renew the tokens if the access token is stale.
    ///
    /// # Errors
    ///
    /// Returns the renewal failure; the stored tokens are kept.
    pub async fn check_token(&self) -> Result<()> {
        self.inner.coordinator.ensure_valid().await
    }

    /// Renew the tokens now.
    ///
    /// # Errors
    ///
    /// Returns [`rinnai_core::CloudError::Unauthenticated`] without a session,
    /// otherwise the renewal failure.
    pub async fn renew_access_token(&self) -> Result<()> {
        self.inner.coordinator.renew().await
    }

    /// Device endpoints, available after login or restore.
    pub fn device(&self) -> Option<&DeviceApi> {
        self.inner.device.get()
    }

    /// User endpoints, available after login or restore.
    pub fn user(&self) -> Option<&UserApi> {
        self.inner.user.get()
    }

    /// The request pipeline, for calls outside the endpoint facades.
    pub fn pipeline(&self) -> &AuthenticatedRequestPipeline {
        &self.inner.pipeline
    }

    /// Returns true with an open transport and an id token.
    pub async fn is_connected(&self) -> bool {
        self.inner.pipeline.is_open() && self.inner.store.get().await.id_token().is_some()
    }

    /// Snapshot of the session, for persistence.
    pub async fn credentials(&self) -> SessionCredentials {
        self.inner.store.get().await
    }

    /// Close the transport if the client owns it. Safe to call repeatedly.
    pub fn close(&self) {
        self.inner.pipeline.close();
    }

    fn init_endpoints(&self) {
        let inner = &self.inner;
        inner.device.get_or_init(|| {
            DeviceApi::new(inner.pipeline.clone(), inner.config.endpoints.clone())
        });
        inner.user.get_or_init(|| {
            UserApi::new(
                inner.pipeline.clone(),
                inner.store.clone(),
                inner.config.endpoints.clone(),
            )
        });
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("pipeline", &self.inner.pipeline)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
