use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use url::Url;

use crate::NetworkError;

/// External service a request targets, used for timeouts and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
	IpGeolocation,
	Geocoding,
	Routing,
}

impl Service {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::IpGeolocation => "ip_geolocation",
			Self::Geocoding => "geocoding",
			Self::Routing => "routing",
		}
	}
}

/// One GET request: endpoint, query parameters and an optional timeout override.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
	pub service: Service,
	pub endpoint: Url,
	pub params: Vec<(String, String)>,
	pub timeout: Option<Duration>,
}

impl Request {
	/// Creates a GET request for `endpoint`.
	pub fn get(service: Service, endpoint: Url) -> Self {
		Self {
			service,
			endpoint,
			params: Vec::new(),
			timeout: None,
		}
	}

	/// Appends one query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));
		self
	}

	/// Overrides the client's timeout for this call.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Endpoint with the query parameters encoded.
	pub fn url(&self) -> Url {
		let mut url = self.endpoint.clone();
		if !self.params.is_empty() {
			url.query_pairs_mut().extend_pairs(self.params.iter());
		}
		url
	}
}

/// Raw reply produced by a transport, before status classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
	pub status: u16,
	pub body: Bytes,
	pub retry_after: Option<Duration>,
}

/// Successful (2xx) reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
	pub status: u16,
	pub body: Bytes,
}

impl Response {
	/// Decodes the body into an explicit schema.
	///
	/// Any mismatch fails closed as [`NetworkError::ServerError`] with no status.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetworkError> {
		serde_json::from_slice(&self.body).map_err(|e| NetworkError::schema(format!("unexpected response body: {e}")))
	}
}

/// Longest body excerpt kept in errors.
const BODY_EXCERPT: usize = 512;

/// Lossy UTF-8 excerpt of a body for error reporting.
pub(crate) fn excerpt(body: &[u8]) -> String {
	let cut = &body[..body.len().min(BODY_EXCERPT)];
	String::from_utf8_lossy(cut).into_owned()
}

/// Maps a raw reply to a success or a classified error.
pub(crate) fn classify(raw: RawResponse) -> Result<Response, NetworkError> {
	match raw.status {
		200..=299 => Ok(Response {
			status: raw.status,
			body: raw.body,
		}),
		429 => Err(NetworkError::RateLimited {
			retry_after: raw.retry_after,
		}),
		500..=599 => Err(NetworkError::ServerError {
			status: Some(raw.status),
			detail: excerpt(&raw.body),
		}),
		status => Err(NetworkError::Rejected {
			status,
			body: excerpt(&raw.body),
		}),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn raw(status: u16, body: &'static str) -> RawResponse {
		RawResponse {
			status,
			body: Bytes::from_static(body.as_bytes()),
			retry_after: None,
		}
	}

	#[test]
	fn url_encodes_params() {
		let req = Request::get(Service::Geocoding, Url::parse("https://nominatim.openstreetmap.org/search").unwrap())
			.param("q", "Brandenburg Gate, Berlin")
			.param("format", "json");
		assert_eq!(
			req.url().as_str(),
			"https://nominatim.openstreetmap.org/search?q=Brandenburg+Gate%2C+Berlin&format=json"
		);
	}

	#[test]
	fn classify_maps_statuses() {
		assert!(classify(raw(200, "{}")).is_ok());
		assert_eq!(
			classify(raw(429, "")),
			Err(NetworkError::RateLimited { retry_after: None })
		);
		assert_eq!(
			classify(raw(502, "bad gateway")),
			Err(NetworkError::ServerError {
				status: Some(502),
				detail: "bad gateway".into()
			})
		);
		assert_eq!(
			classify(raw(400, r#"{"code":"NoRoute"}"#)),
			Err(NetworkError::Rejected {
				status: 400,
				body: r#"{"code":"NoRoute"}"#.into()
			})
		);
	}

	#[test]
	fn json_schema_mismatch_fails_closed() {
		#[derive(Debug, serde::Deserialize)]
		struct Expected {
			#[allow(dead_code)]
			lat: f64,
		}
		let resp = Response {
			status: 200,
			body: Bytes::from_static(br#"{"nope": 1}"#),
		};
		let err = resp.json::<Expected>().unwrap_err();
		assert!(matches!(err, NetworkError::ServerError { status: None, .. }));
	}
}
