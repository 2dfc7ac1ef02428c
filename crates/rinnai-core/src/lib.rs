//! rinnai-core - Core types and traits for the Rinnai Control-R cloud client.
//!
//! This crate holds everything that does not perform I/O: the error taxonomy,
//! token and credential types, client configuration, validated device input,
//! and the two seams the cloud client is built on ([`IdentityProvider`] and
//! [`HttpTransport`]).

pub mod config;
pub mod credentials;
pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use config::{ClientConfig, Endpoints, IdentityPool, RetryPolicy};
pub use credentials::Credentials;
pub use error::{CloudError, Error, ErrorKind, InvalidInputError, ProviderError, RequestError};
pub use tokens::{AccessToken, IdToken, RefreshToken, SessionCredentials, SessionTokens, TokenSet};
pub use traits::{HttpRequest, HttpResponse, HttpTransport, IdentityProvider, Method, TransportFailure};
pub use types::{ApiResponse, DeviceRef, ResponsePayload, TemperatureUnit};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
