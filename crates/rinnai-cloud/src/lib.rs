//! rinnai-cloud - Authenticated client for the Rinnai Control-R cloud.
//!
//! Every API call runs through one [`AuthenticatedRequestPipeline`]: tokens are
//! checked and renewed under a single refresh lock, the request is sent with
//! the current id token, and transient network failures are retried with
//! exponential backoff. Identity-provider and HTTP failures are reported with
//! the error types of [`rinnai_core`].
//!
//! # Example
//!
//! ```no_run
//! use rinnai_cloud::Client;
//!
//! # async fn example() -> Result<(), rinnai_core::Error> {
//! let client = Client::new()?;
//! client.login("user@example.com", "password").await?;
//!
//! if let Some(user) = client.user() {
//!     let info = user.get_info().await?;
//!     println!("{:?}", info.data);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod cognito;
pub mod endpoints;
mod pipeline;
mod refresh;
mod store;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use cognito::CognitoIdentityProvider;
pub use endpoints::{DeviceApi, UserApi};
pub use pipeline::{AuthenticatedRequestPipeline, RequestOptions, TransportFactory};
pub use refresh::TokenRefreshCoordinator;
pub use store::CredentialStore;
pub use transport::{ReqwestTransport, RetryingTransport};
