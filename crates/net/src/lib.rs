//! Outbound HTTP for the location, geocoding and routing services.
//!
//! [`NetworkClient`] wraps a [`Transport`] with per-call timeouts and
//! retry/backoff. It holds no per-call state; responses are decoded by the
//! caller into explicit schemas through [`Response::json`].

mod client;
mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
mod request;
mod retry;
mod transport;

pub use client::{DEFAULT_TIMEOUT, NetworkClient};
pub use error::{NetworkError, Result, TransportError};
pub use request::{RawResponse, Request, Response, Service};
pub use retry::RetryPolicy;
pub use transport::{ReqwestTransport, Transport, polite_user_agent};
