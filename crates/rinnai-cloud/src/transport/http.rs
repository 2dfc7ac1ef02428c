//! HTTP transport backed by reqwest.

use std::error::Error as StdError;
use std::io;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use rinnai_core::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFailure};

/// The default network session.
///
/// Holds one reqwest connection pool until closed. A closed transport
/// rejects every request with [`TransportFailure::Closed`].
pub struct ReqwestTransport {
    client: Mutex<Option<reqwest::Client>>,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportFailure> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rinnai-cloud/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportFailure::Protocol {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self::with_client(client))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Mutex::new(Some(client)),
        }
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn current_client(&self) -> Option<reqwest::Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let client = self.current_client().ok_or(TransportFailure::Closed)?;
        let timeout = request.timeout;

        let mut builder = client
            .request(Self::to_reqwest_method(request.method), request.url)
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| map_error(&e, timeout))?;
        let status = response.status().as_u16();
        trace!(status, "HTTP response");

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::Timeout {
                    duration_ms: timeout.as_millis() as u64,
                }
            } else {
                TransportFailure::Protocol {
                    message: format!("failed to read response body: {}", error_chain(&e)),
                }
            }
        })?;

        Ok(HttpResponse { status, body })
    }

    fn close(&self) {
        let previous = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!("Closed HTTP transport");
        }
    }

    fn is_closed(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Classify a reqwest send failure.
fn map_error(error: &reqwest::Error, timeout: Duration) -> TransportFailure {
    if error.is_timeout() {
        return TransportFailure::Timeout {
            duration_ms: timeout.as_millis() as u64,
        };
    }

    let message = error_chain(error);
    if error.is_connect() {
        return TransportFailure::Connect { message };
    }
    if is_connection_reset(error) {
        return TransportFailure::ConnectionReset { message };
    }
    TransportFailure::Protocol { message }
}

fn is_connection_reset(error: &(dyn StdError + 'static)) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_error.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        // hyper reports a peer hanging up mid-response without an io::Error.
        if cause
            .to_string()
            .contains("connection closed before message completed")
        {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Render an error and its sources as one message.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn closed_transport_rejects_requests() {
        let transport = ReqwestTransport::new().unwrap();
        assert!(!transport.is_closed());

        transport.close();
        transport.close();
        assert!(transport.is_closed());

        let request = HttpRequest::new(
            Method::Get,
            Url::parse("http://127.0.0.1:9/").unwrap(),
            Duration::from_secs(1),
        );
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportFailure::Closed));
    }

    #[tokio::test]
    async fn refused_connection_is_transient() {
        // Bind then drop a listener to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = ReqwestTransport::new().unwrap();
        let request = HttpRequest::new(
            Method::Get,
            Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap(),
            Duration::from_secs(5),
        );

        let err = transport.send(request).await.unwrap_err();
        assert!(err.is_transient(), "unexpected failure: {err:?}");
    }
}
