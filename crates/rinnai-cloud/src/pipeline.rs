//! The authenticated request pipeline every API call goes through.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};
use url::Url;

use rinnai_core::{
    ClientConfig, HttpRequest, HttpTransport, InvalidInputError, Method, RequestError,
    ResponsePayload, Result, TransportFailure,
};

use crate::refresh::TokenRefreshCoordinator;
use crate::store::CredentialStore;
use crate::transport::{ReqwestTransport, RetryingTransport};

/// Creates the library-owned transport on first use.
pub type TransportFactory =
    Arc<dyn Fn() -> std::result::Result<Arc<dyn HttpTransport>, TransportFailure> + Send + Sync>;

/// Headers and body of a single API call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<'a>(mut self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<Self> {
        Ok(self.body(serde_json::to_string(value)?))
    }
}

enum Connection {
    None,
    Owned(Arc<dyn HttpTransport>),
    External(Arc<dyn HttpTransport>),
}

/// Composes token freshness, the retrying transport and the connection.
///
/// A caller-supplied transport is used as-is and never closed by the
/// pipeline. Otherwise a transport is created lazily, recreated if it was
/// closed, and closed again by [`AuthenticatedRequestPipeline::close`] or
/// when the pipeline is dropped.
pub struct AuthenticatedRequestPipeline {
    store: Arc<CredentialStore>,
    coordinator: Arc<TokenRefreshCoordinator>,
    retrying: RetryingTransport,
    connection: Mutex<Connection>,
    factory: TransportFactory,
    request_limit: Option<Semaphore>,
}

impl AuthenticatedRequestPipeline {
    pub fn new(
        config: &ClientConfig,
        store: Arc<CredentialStore>,
        coordinator: Arc<TokenRefreshCoordinator>,
        transport: Option<Arc<dyn HttpTransport>>,
    ) -> Self {
        let connection = match transport {
            Some(transport) => Connection::External(transport),
            None => Connection::None,
        };

        Self {
            store,
            coordinator,
            retrying: RetryingTransport::new(config.retry.clone(), config.request_timeout),
            connection: Mutex::new(connection),
            factory: Arc::new(|| {
                let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
                Ok(transport)
            }),
            request_limit: config.max_concurrent_requests.map(Semaphore::new),
        }
    }

    /// Replace how the owned transport is created.
    pub fn with_transport_factory(mut self, factory: TransportFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Perform one authenticated call.
    ///
    /// Ensures the tokens are fresh, then sends the request with the current
    /// id token and retries transient failures.
    ///
    /// # Errors
    ///
    /// Returns token renewal failures untouched, [`InvalidInputError::Url`]
    /// for a malformed URL, and otherwise the transport's [`RequestError`].
    #[instrument(skip(self, options))]
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<ResponsePayload> {
        let target = Url::parse(url).map_err(|e| InvalidInputError::Url {
            value: url.to_string(),
            reason: e.to_string(),
        })?;

        self.coordinator.ensure_valid().await?;
        let creds = self.store.get().await;

        let _permit = match &self.request_limit {
            Some(limit) => Some(limit.acquire().await.map_err(|e| RequestError::Client {
                url: url.to_string(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let transport = self.transport().map_err(|e| RequestError::Client {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut request = HttpRequest::new(method, target, self.retrying.request_timeout());
        request.headers = options.headers;
        request.body = options.body;

        self.retrying
            .send(transport.as_ref(), request, creds.id_token())
            .await
    }

    /// Returns true if a transport exists and has not been closed.
    pub fn is_open(&self) -> bool {
        match &*self.lock_connection() {
            Connection::None => false,
            Connection::Owned(transport) | Connection::External(transport) => {
                !transport.is_closed()
            }
        }
    }

    /// Close the owned transport. Safe to call any number of times; a
    /// caller-supplied transport is left open.
    pub fn close(&self) {
        let mut connection = self.lock_connection();
        if let Connection::Owned(transport) = &*connection {
            transport.close();
            *connection = Connection::None;
            debug!("Released owned transport");
        }
    }

    fn transport(&self) -> std::result::Result<Arc<dyn HttpTransport>, TransportFailure> {
        let mut connection = self.lock_connection();
        match &*connection {
            Connection::Owned(transport) | Connection::External(transport)
                if !transport.is_closed() =>
            {
                return Ok(transport.clone());
            }
            _ => {}
        }

        debug!("Creating owned transport");
        let transport = (self.factory)()?;
        *connection = Connection::Owned(transport.clone());
        Ok(transport)
    }

    fn lock_connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AuthenticatedRequestPipeline {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AuthenticatedRequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owned = matches!(&*self.lock_connection(), Connection::Owned(_));
        f.debug_struct("AuthenticatedRequestPipeline")
            .field("retry", self.retrying.policy())
            .field("owned_transport", &owned)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
