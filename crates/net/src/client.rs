//! Retrying HTTP client for the location, geocoding and routing services.
//!
//! Every call runs under a per-call timeout. Transient failures (timeouts,
//! connection failures, HTTP 5xx) are retried with jittered exponential
//! backoff; HTTP 429 and other 4xx responses end the call immediately.
//! Callers only see the outcome of the final attempt.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::request::classify;
use crate::{NetworkError, Request, Response, RetryPolicy, Transport};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless per-call HTTP client with retry/backoff.
#[derive(Clone)]
pub struct NetworkClient {
	transport: Arc<dyn Transport>,
	policy: RetryPolicy,
	timeout: Duration,
}

impl std::fmt::Debug for NetworkClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NetworkClient")
			.field("policy", &self.policy)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

impl NetworkClient {
	/// Creates a client with the default retry policy and timeout.
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self {
			transport,
			policy: RetryPolicy::default(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Replaces the retry policy.
	pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Replaces the default per-call timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Performs `request`, retrying transient failures.
	pub async fn call(&self, request: &Request) -> Result<Response, NetworkError> {
		let url = request.url();
		let timeout = request.timeout.unwrap_or(self.timeout);
		let attempts = self.policy.attempts();
		let service = request.service.as_str();

		let mut attempt = 0u32;
		loop {
			debug!(service, url = %url, attempt = attempt + 1, attempts, "net.request");
			let outcome = match tokio::time::timeout(timeout, self.transport.get(&url, timeout)).await {
				Err(_) => Err(NetworkError::Timeout),
				Ok(result) => result.map_err(NetworkError::from).and_then(classify),
			};

			match outcome {
				Ok(response) => {
					debug!(service, status = response.status, bytes = response.body.len(), "net.response");
					return Ok(response);
				}
				Err(err) if err.is_transient() && attempt + 1 < attempts => {
					let delay = self.policy.sample_delay(attempt);
					warn!(service, attempt = attempt + 1, ?delay, error = %err, "net.retry");
					tokio::time::sleep(delay).await;
					attempt += 1;
				}
				Err(err) => {
					warn!(service, attempt = attempt + 1, error = %err, "net.failed");
					return Err(err);
				}
			}
		}
	}
}
