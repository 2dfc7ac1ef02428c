//! Error types for the Rinnai cloud client.
//!
//! This module provides a unified error type with explicit variants for
//! request, identity-provider, timeout, and input validation errors, plus the
//! table that maps identity-provider error codes onto local error kinds.

use serde::Serialize;
use thiserror::Error;

/// The unified error type for client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP or network failures, including retry exhaustion.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Identity provider failures (login, token renewal).
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// An identity-provider call did not finish within the executor timeout.
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Input validation errors, raised before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the stable error kind, or `None` for validation errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Request(_) | Error::Timeout { .. } => Some(ErrorKind::TransportError),
            Error::Cloud(err) => Some(err.kind()),
            Error::InvalidInput(_) => None,
        }
    }

    /// Returns true if the caller has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::Cloud(CloudError::Unauthenticated { .. } | CloudError::UserNotFound { .. })
        )
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Error::Cloud(CloudError::from(err))
    }
}

/// Stable classification of every non-validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Unauthenticated,
    UserNotFound,
    UserAlreadyExists,
    UserNotConfirmed,
    PasswordChangeRequired,
    UnknownProviderError,
    TransportError,
}

/// Identity provider error codes and the local kind each one maps to.
pub const PROVIDER_ERROR_CODES: [(&str, ErrorKind); 5] = [
    ("UserNotFoundException", ErrorKind::UserNotFound),
    ("UserNotConfirmedException", ErrorKind::UserNotConfirmed),
    ("UsernameExistsException", ErrorKind::UserAlreadyExists),
    ("NotAuthorizedException", ErrorKind::Unauthenticated),
    ("PasswordResetRequiredException", ErrorKind::PasswordChangeRequired),
];

/// Challenge name the provider uses when a new password must be set.
pub const NEW_PASSWORD_REQUIRED_CHALLENGE: &str = "NEW_PASSWORD_REQUIRED";

/// Request-level errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} response error for {url}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Payload error while requesting {url}: {message}")]
    Payload { url: String, message: String },

    /// Any other client or protocol error.
    #[error("Client error while requesting {url}: {message}")]
    Client { url: String, message: String },

    /// All attempts failed with transient errors.
    #[error("Request to {url} failed after {attempts} attempts: {message}")]
    Exhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The GraphQL endpoint reported errors in an otherwise valid response.
    #[error("GraphQL errors: {messages}")]
    GraphQl { url: String, messages: String },
}

impl RequestError {
    /// Returns the URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            RequestError::Status { url, .. }
            | RequestError::Payload { url, .. }
            | RequestError::Client { url, .. }
            | RequestError::Exhausted { url, .. }
            | RequestError::GraphQl { url, .. } => url,
        }
    }

    /// Returns the number of attempts made when retries were exhausted.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RequestError::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// Errors reported by the identity provider, mapped to local kinds.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("user not found: {message}")]
    UserNotFound { message: String },

    #[error("user already exists: {message}")]
    UserAlreadyExists { message: String },

    #[error("user not confirmed: {message}")]
    UserNotConfirmed { message: String },

    #[error("password change required: {message}")]
    PasswordChangeRequired { message: String },

    #[error("unknown provider error [{code}]: {message}")]
    Unknown { code: String, message: String },
}

impl CloudError {
    /// Map a provider error code to the matching local error.
    ///
    /// Codes missing from [`PROVIDER_ERROR_CODES`] become [`CloudError::Unknown`].
    pub fn from_provider_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = PROVIDER_ERROR_CODES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, kind)| *kind);

        match kind {
            Some(ErrorKind::UserNotFound) => CloudError::UserNotFound { message },
            Some(ErrorKind::UserNotConfirmed) => CloudError::UserNotConfirmed { message },
            Some(ErrorKind::UserAlreadyExists) => CloudError::UserAlreadyExists { message },
            Some(ErrorKind::Unauthenticated) => CloudError::Unauthenticated { message },
            Some(ErrorKind::PasswordChangeRequired) => {
                CloudError::PasswordChangeRequired { message }
            }
            _ => CloudError::Unknown {
                code: code.to_string(),
                message,
            },
        }
    }

    /// Returns the stable error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudError::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            CloudError::UserNotFound { .. } => ErrorKind::UserNotFound,
            CloudError::UserAlreadyExists { .. } => ErrorKind::UserAlreadyExists,
            CloudError::UserNotConfirmed { .. } => ErrorKind::UserNotConfirmed,
            CloudError::PasswordChangeRequired { .. } => ErrorKind::PasswordChangeRequired,
            CloudError::Unknown { .. } => ErrorKind::UnknownProviderError,
        }
    }
}

/// A failure reported across the identity provider boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the call with an error code.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    /// The provider answered with a challenge this client cannot complete.
    #[error("unsupported authentication challenge: {name}")]
    Challenge { name: String },

    /// The provider could not be reached or answered with garbage.
    #[error("identity provider request failed: {message}")]
    Transport { message: String },
}

impl From<ProviderError> for CloudError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Service { code, message } => {
                CloudError::from_provider_code(&code, message)
            }
            ProviderError::Challenge { name } if name == NEW_PASSWORD_REQUIRED_CHALLENGE => {
                CloudError::PasswordChangeRequired {
                    message: "Password change required.".to_string(),
                }
            }
            ProviderError::Challenge { name } => CloudError::Unknown {
                code: name.clone(),
                message: format!("unsupported authentication challenge {name}"),
            },
            ProviderError::Transport { message } => CloudError::Unknown {
                code: String::new(),
                message,
            },
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Temperature outside the supported range.
    #[error("Temperature must be between {min} and {max}°{unit}, got {value}°{unit}")]
    Temperature {
        value: f64,
        min: i64,
        max: i64,
        unit: char,
    },

    /// Recirculation duration outside the supported range.
    #[error("Duration must be between {min} and {max} minutes, got {value}")]
    Duration { value: i64, min: i64, max: i64 },

    /// Device record without a usable thing name.
    #[error("Device must have a 'thing_name' attribute")]
    MissingThingName,

    /// Thing name that would not stay a single URL path segment.
    #[error("Invalid thing name '{value}': must not contain '/', '\\', '?', '#' or '%' or be a dot segment")]
    InvalidThingName { value: String },

    /// Malformed request URL.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// Invalid client configuration value.
    #[error("invalid configuration '{field}': {reason}")]
    Config { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_provider_codes() {
        let err = CloudError::from_provider_code("NotAuthorizedException", "Incorrect password.");
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert!(err.to_string().contains("Incorrect password."));

        let err = CloudError::from_provider_code("UserNotFoundException", "User does not exist.");
        assert_eq!(err.kind(), ErrorKind::UserNotFound);

        let err = CloudError::from_provider_code("UsernameExistsException", "taken");
        assert_eq!(err.kind(), ErrorKind::UserAlreadyExists);

        let err = CloudError::from_provider_code("UserNotConfirmedException", "confirm");
        assert_eq!(err.kind(), ErrorKind::UserNotConfirmed);

        let err = CloudError::from_provider_code("PasswordResetRequiredException", "reset");
        assert_eq!(err.kind(), ErrorKind::PasswordChangeRequired);
    }

    #[test]
    fn unmapped_code_is_unknown() {
        let err = CloudError::from_provider_code("TooManyRequestsException", "slow down");
        assert_eq!(err.kind(), ErrorKind::UnknownProviderError);
        assert!(err.to_string().contains("TooManyRequestsException"));
    }

    #[test]
    fn new_password_challenge_requires_password_change() {
        let err = CloudError::from(ProviderError::Challenge {
            name: NEW_PASSWORD_REQUIRED_CHALLENGE.to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::PasswordChangeRequired);
    }

    #[test]
    fn provider_transport_failure_is_unknown() {
        let err: Error = ProviderError::Transport {
            message: "dns".to_string(),
        }
        .into();
        assert_eq!(err.kind(), Some(ErrorKind::UnknownProviderError));
        assert!(!err.requires_login());
    }

    #[test]
    fn validation_errors_have_no_kind() {
        let err = Error::from(InvalidInputError::MissingThingName);
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn exhausted_error_reports_attempts() {
        let err = RequestError::Exhausted {
            url: "https://api.example.com/test".to_string(),
            attempts: 3,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.attempts(), Some(3));
        assert_eq!(err.url(), "https://api.example.com/test");
        assert!(err.to_string().contains("failed after 3 attempts"));
    }
}
