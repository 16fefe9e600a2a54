//! Error types for outbound service calls.

use std::time::Duration;

use thiserror::Error;

/// Final outcome of a failed [`crate::NetworkClient::call`].
///
/// Transient failures are retried inside the client; callers only ever see
/// the error of the last attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
	/// No response within the per-call timeout.
	#[error("request timed out")]
	Timeout,

	/// Connection could not be established or was reset.
	#[error("connection failed: {0}")]
	ConnectionFailed(String),

	/// The service answered HTTP 429. Never retried.
	#[error("rate limited by service{}", retry_after.map(|d| format!(" (retry after {}s)", d.as_secs())).unwrap_or_default())]
	RateLimited {
		/// `Retry-After` hint, when the service sent one.
		retry_after: Option<Duration>,
	},

	/// HTTP 5xx, or a body that does not match the expected schema.
	#[error("server error{}: {detail}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
	ServerError {
		/// HTTP status, `None` for schema mismatches on a successful response.
		status: Option<u16>,
		/// Short human-readable description.
		detail: String,
	},

	/// HTTP 4xx other than 429. Never retried.
	#[error("request rejected with HTTP {status}")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Truncated response body, kept so callers can read structured error codes.
		body: String,
	},
}

impl NetworkError {
	/// Builds a schema-mismatch error for a response that decoded badly.
	pub fn schema(detail: impl Into<String>) -> Self {
		Self::ServerError {
			status: None,
			detail: detail.into(),
		}
	}

	/// Returns true for failures worth another attempt: timeouts, connection
	/// failures and HTTP 5xx.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Timeout | Self::ConnectionFailed(_) => true,
			Self::ServerError { status: Some(s), .. } => (500..600).contains(s),
			Self::ServerError { status: None, .. } | Self::RateLimited { .. } | Self::Rejected { .. } => false,
		}
	}
}

/// Failure reported by a [`crate::Transport`] before any HTTP status exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	#[error("transport timed out")]
	Timeout,
	#[error("connect error: {0}")]
	Connect(String),
	#[error("transport error: {0}")]
	Other(String),
}

impl From<TransportError> for NetworkError {
	fn from(err: TransportError) -> Self {
		match err {
			TransportError::Timeout => Self::Timeout,
			TransportError::Connect(msg) | TransportError::Other(msg) => Self::ConnectionFailed(msg),
		}
	}
}

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(NetworkError::Timeout, true)]
	#[case(NetworkError::ConnectionFailed("reset".into()), true)]
	#[case(NetworkError::ServerError { status: Some(503), detail: String::new() }, true)]
	#[case(NetworkError::schema("missing field"), false)]
	#[case(NetworkError::RateLimited { retry_after: None }, false)]
	#[case(NetworkError::Rejected { status: 400, body: String::new() }, false)]
	fn transient_classification(#[case] err: NetworkError, #[case] transient: bool) {
		assert_eq!(err.is_transient(), transient);
	}

	#[test]
	fn rate_limit_message_includes_hint() {
		let err = NetworkError::RateLimited {
			retry_after: Some(Duration::from_secs(30)),
		};
		assert_eq!(err.to_string(), "rate limited by service (retry after 30s)");
	}
}
