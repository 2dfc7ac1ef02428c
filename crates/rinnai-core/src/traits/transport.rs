//! HTTP transport trait and its request/response types.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// HTTP methods used by the cloud API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single HTTP attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Upper bound for this attempt.
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url, timeout: Duration) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    /// Returns the first header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing any existing header of the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}

/// The raw answer to an [`HttpRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A failure below the HTTP layer; no response was received.
#[derive(Debug, Clone, Error)]
pub enum TransportFailure {
    /// The connection could not be established.
    #[error("connection failed: {message}")]
    Connect { message: String },

    /// The server dropped or reset the connection.
    #[error("connection reset: {message}")]
    ConnectionReset { message: String },

    /// The attempt did not complete in time.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Any other client or protocol failure.
    #[error("{message}")]
    Protocol { message: String },

    /// The transport was closed.
    #[error("transport is closed")]
    Closed,
}

impl TransportFailure {
    /// Returns true for failures that are safe to retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportFailure::Connect { .. }
                | TransportFailure::ConnectionReset { .. }
                | TransportFailure::Timeout { .. }
        )
    }
}

/// The network session requests are sent through.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one attempt.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;

    /// Release the underlying connections. Must be idempotent.
    fn close(&self);

    /// Returns true once [`HttpTransport::close`] has been called.
    fn is_closed(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_replaces_case_insensitively() {
        let url = Url::parse("https://api.example.com/test").unwrap();
        let mut request = HttpRequest::new(Method::Get, url, Duration::from_secs(1));
        request.set_header("authorization", "Bearer old");
        request.set_header("Authorization", "Bearer new");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer new"));
    }

    #[test]
    fn only_network_failures_are_transient() {
        assert!(TransportFailure::Connect { message: "refused".into() }.is_transient());
        assert!(TransportFailure::ConnectionReset { message: "reset".into() }.is_transient());
        assert!(TransportFailure::Timeout { duration_ms: 10 }.is_transient());
        assert!(!TransportFailure::Protocol { message: "bad".into() }.is_transient());
        assert!(!TransportFailure::Closed.is_transient());
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
