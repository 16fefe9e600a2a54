use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER};
use url::Url;

use crate::{RawResponse, TransportError};

/// Issues one HTTP GET. Implementations do not retry and do not classify
/// statuses; both are the client's job.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn get(&self, url: &Url, timeout: Duration) -> Result<RawResponse, TransportError>;
}

/// Builds the User-Agent sent with every request.
///
/// Public Nominatim and OSRM instances require an identifying agent with a
/// contact address.
pub fn polite_user_agent(contact: &str) -> String {
	let contact = match contact.trim() {
		"" => "you@example.com",
		c => c,
	};
	format!("wayfinder/{} (+contact: {contact})", env!("CARGO_PKG_VERSION"))
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
}

impl ReqwestTransport {
	/// Creates a transport sending `user_agent` and `Accept: application/json`.
	pub fn new(user_agent: &str) -> Result<Self, TransportError> {
		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
		let client = Client::builder()
			.user_agent(user_agent)
			.default_headers(headers)
			.build()
			.map_err(|e| TransportError::Other(e.to_string()))?;
		Ok(Self { client })
	}
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
	if err.is_timeout() {
		TransportError::Timeout
	} else if err.is_connect() {
		TransportError::Connect(err.to_string())
	} else {
		TransportError::Other(err.to_string())
	}
}

/// Parses a delta-seconds `Retry-After` header; HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
	headers
		.get(RETRY_AFTER)?
		.to_str()
		.ok()?
		.trim()
		.parse::<u64>()
		.ok()
		.map(Duration::from_secs)
}

#[async_trait]
impl Transport for ReqwestTransport {
	async fn get(&self, url: &Url, timeout: Duration) -> Result<RawResponse, TransportError> {
		let response = self
			.client
			.get(url.clone())
			.timeout(timeout)
			.send()
			.await
			.map_err(map_reqwest_error)?;

		let status = response.status().as_u16();
		let retry_after = retry_after(response.headers());
		let body = response.bytes().await.map_err(map_reqwest_error)?;

		Ok(RawResponse {
			status,
			body,
			retry_after,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_carries_contact() {
		let ua = polite_user_agent("maps@example.org");
		assert!(ua.starts_with("wayfinder/"));
		assert!(ua.ends_with("(+contact: maps@example.org)"));
		assert!(polite_user_agent("  ").ends_with("(+contact: you@example.com)"));
	}

	#[test]
	fn retry_after_reads_delta_seconds() {
		let mut headers = HeaderMap::new();
		headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
		assert_eq!(retry_after(&headers), Some(Duration::from_secs(12)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
		assert_eq!(retry_after(&headers), None);
	}
}
