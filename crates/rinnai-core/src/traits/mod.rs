//! Core traits for identity and transport behavior.

mod identity;
mod transport;

pub use identity::IdentityProvider;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFailure};
