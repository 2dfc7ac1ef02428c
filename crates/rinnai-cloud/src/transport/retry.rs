//! Authenticated HTTP calls with exponential backoff.

use std::time::Duration;

use tracing::{debug, instrument, warn};
use url::Url;

use rinnai_core::{
    HttpRequest, HttpResponse, HttpTransport, IdToken, RequestError, ResponsePayload, Result,
    RetryPolicy, TransportFailure,
};

/// Runs one request through a transport, retrying transient failures.
///
/// Connection failures, resets and per-attempt timeouts are retried with the
/// delay multiplied after every attempt. HTTP status errors, undecodable
/// bodies and other client errors fail at once.
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl RetryingTransport {
    pub fn new(policy: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            policy,
            request_timeout,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Send `request`, adding the `Host` header and, with a token, the bearer
    /// `Authorization` header to every attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Exhausted`] once every attempt failed with a
    /// transient error, or the matching [`RequestError`] for the first
    /// non-transient failure.
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn send(
        &self,
        transport: &dyn HttpTransport,
        mut request: HttpRequest,
        bearer: Option<&IdToken>,
    ) -> Result<ResponsePayload> {
        let url = request.url.to_string();
        if let Some(host) = host_header(&request.url) {
            request.set_header("Host", host);
        }
        if let Some(token) = bearer {
            request.set_header("Authorization", format!("Bearer {}", token.as_str()));
        }
        request.timeout = self.request_timeout;

        let max_attempts = self.policy.max_attempts();
        let mut delay = self.policy.initial_delay();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let failure = match self.attempt(transport, request.clone()).await {
                Ok(response) => return interpret(&url, response),
                Err(failure) => failure,
            };

            if !failure.is_transient() {
                return Err(RequestError::Client {
                    url,
                    message: failure.to_string(),
                }
                .into());
            }

            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %failure, "Request failed, no attempts left");
                return Err(RequestError::Exhausted {
                    url,
                    attempts: attempt,
                    message: failure.to_string(),
                }
                .into());
            }

            debug!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Transient error, retrying"
            );
            tokio::time::sleep(delay).await;
            delay = self.policy.next_delay(delay);
        }
    }

    async fn attempt(
        &self,
        transport: &dyn HttpTransport,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportFailure> {
        match tokio::time::timeout(self.request_timeout, transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportFailure::Timeout {
                duration_ms: self.request_timeout.as_millis() as u64,
            }),
        }
    }
}

/// `host[:port]` of a URL; the port only when it is not the scheme default.
fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn interpret(url: &str, response: HttpResponse) -> Result<ResponsePayload> {
    if !response.is_success() {
        let message = reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        return Err(RequestError::Status {
            url: url.to_string(),
            status: response.status,
            message,
        }
        .into());
    }

    ResponsePayload::from_body(&response.body).map_err(|e| {
        RequestError::Payload {
            url: url.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
