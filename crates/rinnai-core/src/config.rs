//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::InvalidInputError;

/// Default per-attempt request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for a single identity-provider call.
pub const DEFAULT_EXECUTOR_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of attempts for a request.
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default delay before the first retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Default backoff multiplier.
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;

pub const DEFAULT_POOL_ID: &str = "us-east-1_OcwpRQbMM";
pub const DEFAULT_CLIENT_ID: &str = "5ghq3i6k4p9s7dfu34ckmec91";
pub const DEFAULT_POOL_REGION: &str = "us-east-1";

pub const DEFAULT_GRAPHQL_URL: &str =
    "https://s34ox7kri5dsvdr43bfgp6qh6i.appsync-api.us-east-1.amazonaws.com/graphql";
pub const DEFAULT_SHADOW_BASE_URL: &str = "https://698suy4zs3.execute-api.us-east-1.amazonaws.com/Prod";

/// Exponential backoff policy for transient request failures.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use rinnai_core::RetryPolicy;
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(500), 2.0).unwrap();
/// assert_eq!(policy.next_delay(Duration::from_millis(500)), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Create a validated retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero or `backoff_multiplier` is
    /// below 1 or not finite.
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        backoff_multiplier: f64,
    ) -> Result<Self, InvalidInputError> {
        if max_attempts == 0 {
            return Err(InvalidInputError::Config {
                field: "retry_count",
                reason: "at least one attempt is required".to_string(),
            });
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
            return Err(InvalidInputError::Config {
                field: "retry_multiplier",
                reason: format!("must be a finite number >= 1, got {backoff_multiplier}"),
            });
        }

        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Returns the delay that follows `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_multiplier)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_COUNT,
            initial_delay: DEFAULT_RETRY_DELAY,
            backoff_multiplier: DEFAULT_RETRY_MULTIPLIER,
        }
    }
}

/// The managed user pool accounts live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPool {
    pub pool_id: String,
    pub client_id: String,
    pub region: String,
    /// Overrides the regional provider endpoint (used by tests and proxies).
    pub endpoint: Option<String>,
}

impl IdentityPool {
    /// Returns the URL identity-provider calls are sent to.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self {
            pool_id: DEFAULT_POOL_ID.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            region: DEFAULT_POOL_REGION.to_string(),
            endpoint: None,
        }
    }
}

/// Service endpoints used by the device and user facades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub graphql: String,
    pub shadow_base: String,
}

impl Endpoints {
    /// Returns the shadow document URL of a device.
    pub fn shadow_url(&self, thing_name: &str) -> String {
        format!(
            "{}/thing/{}/shadow",
            self.shadow_base.trim_end_matches('/'),
            thing_name
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graphql: DEFAULT_GRAPHQL_URL.to_string(),
            shadow_base: DEFAULT_SHADOW_BASE_URL.to_string(),
        }
    }
}

/// Construction-time options for the cloud client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Timeout of a single request attempt.
    pub request_timeout: Duration,
    /// Timeout of a single identity-provider call.
    pub executor_timeout: Duration,
    pub retry: RetryPolicy,
    /// Upper bound on concurrent outbound requests; `None` is unbounded.
    pub max_concurrent_requests: Option<usize>,
    pub identity_pool: IdentityPool,
    pub endpoints: Endpoints,
}

impl ClientConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_executor_timeout(mut self, timeout: Duration) -> Self {
        self.executor_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = Some(limit);
        self
    }

    pub fn with_identity_pool(mut self, pool: IdentityPool) -> Self {
        self.identity_pool = pool;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Check the values a [`RetryPolicy`] cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns an error for zero timeouts, a zero concurrency limit, or an
    /// endpoint that is not an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if self.request_timeout.is_zero() {
            return Err(InvalidInputError::Config {
                field: "request_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.executor_timeout.is_zero() {
            return Err(InvalidInputError::Config {
                field: "executor_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_concurrent_requests == Some(0) {
            return Err(InvalidInputError::Config {
                field: "max_concurrent_requests",
                reason: "must allow at least one request".to_string(),
            });
        }

        check_http_url(&self.endpoints.graphql)?;
        check_http_url(&self.endpoints.shadow_base)?;
        if let Some(endpoint) = &self.identity_pool.endpoint {
            check_http_url(endpoint)?;
        }
        Ok(())
    }
}

fn check_http_url(value: &str) -> Result<(), InvalidInputError> {
    let url = Url::parse(value).map_err(|e| InvalidInputError::Url {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(InvalidInputError::Url {
            value: value.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            executor_timeout: DEFAULT_EXECUTOR_TIMEOUT,
            retry: RetryPolicy::default(),
            max_concurrent_requests: None,
            identity_pool: IdentityPool::default(),
            endpoints: Endpoints::default(),
        }
    }
}
