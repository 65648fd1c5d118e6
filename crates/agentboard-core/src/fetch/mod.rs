//! Relay access: the transport seam, the HTTP implementation, and the
//! executor that turns one resource key into one committed fetch.

pub mod errors;
pub mod executor;
pub mod http;
pub mod mutations;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use errors::FetchError;
pub use executor::FetchExecutor;
pub use http::HttpTransport;
pub use traits::{Method, RelayRequest, Transport};
