//! Network transports.

mod http;
mod retry;

pub use http::ReqwestTransport;
pub use retry::RetryingTransport;
