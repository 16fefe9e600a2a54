//! Free-text address lookup against a Nominatim-compatible search endpoint.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;
use wayfinder_net::{NetworkClient, NetworkError, Request, Service};
use wayfinder_primitives::Coordinate;

use crate::GeocodeError;

/// Public Nominatim search endpoint.
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Clone)]
pub struct GeocodingService {
	net: NetworkClient,
	endpoint: Url,
	timeout: Option<Duration>,
}

impl GeocodingService {
	pub fn new(net: NetworkClient, endpoint: Url) -> Self {
		Self {
			net,
			endpoint,
			timeout: None,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Resolves `text` to the most relevant match.
	///
	/// Blank input is rejected without a network call.
	pub async fn geocode(&self, text: &str) -> Result<Coordinate, GeocodeError> {
		let query = text.trim();
		if query.is_empty() {
			return Err(GeocodeError::EmptyInput);
		}

		let mut request = Request::get(Service::Geocoding, self.endpoint.clone())
			.param("q", query)
			.param("format", "json")
			.param("limit", "1");
		if let Some(timeout) = self.timeout {
			request = request.timeout(timeout);
		}

		let places: Vec<Place> = self.net.call(&request).await?.json()?;
		let Some(place) = places.into_iter().next() else {
			debug!(query, "geocode.not_found");
			return Err(GeocodeError::NotFound);
		};
		let coordinate = place.coordinate()?;
		debug!(query, %coordinate, name = place.display_name.as_deref().unwrap_or(""), "geocode.resolved");
		Ok(coordinate)
	}
}

#[derive(Debug, Deserialize)]
struct Place {
	lat: Degrees,
	lon: Degrees,
	display_name: Option<String>,
}

/// Nominatim sends degrees as strings; some mirrors send numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
	Text(String),
	Number(f64),
}

impl Degrees {
	fn value(&self) -> Result<f64, NetworkError> {
		match self {
			Self::Number(v) => Ok(*v),
			Self::Text(s) => s
				.trim()
				.parse()
				.map_err(|_| NetworkError::schema(format!("invalid degrees {s:?}"))),
		}
	}
}

impl Place {
	fn coordinate(&self) -> Result<Coordinate, NetworkError> {
		Coordinate::new(self.lat.value()?, self.lon.value()?).map_err(|e| NetworkError::schema(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use pretty_assertions::assert_eq;
	use serde_json::json;
	use wayfinder_net::mock::{Reply, ScriptedTransport};

	use super::*;

	fn service(transport: &Arc<ScriptedTransport>) -> GeocodingService {
		let endpoint = Url::parse("https://geo.test/search").unwrap();
		GeocodingService::new(NetworkClient::new(transport.clone()), endpoint)
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn blank_input_makes_no_request() {
		let transport = Arc::new(ScriptedTransport::new());
		let geo = service(&transport);

		assert_eq!(geo.geocode("   ").await, Err(GeocodeError::EmptyInput));
		assert_eq!(geo.geocode("").await, Err(GeocodeError::EmptyInput));
		assert!(transport.calls().is_empty());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn first_result_wins() {
		let transport = Arc::new(ScriptedTransport::new());
		transport.on(
			"geo.test",
			[Reply::json(
				200,
				json!([
					{"lat": "52.5162746", "lon": "13.3777041", "display_name": "Brandenburger Tor"},
					{"lat": "48.0", "lon": "11.0"}
				]),
			)],
		);

		let coordinate = service(&transport).geocode(" Brandenburg Gate, Berlin ").await.unwrap();

		assert!(coordinate.approx_eq(&Coordinate::new(52.5162746, 13.3777041).unwrap(), 1e-9));
		let url = &transport.calls()[0];
		assert!(url.as_str().contains("q=Brandenburg+Gate%2C+Berlin"), "{url}");
		assert!(url.as_str().contains("limit=1"), "{url}");
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn empty_result_is_not_found() {
		let transport = Arc::new(ScriptedTransport::new());
		transport.on("geo.test", [Reply::json(200, json!([]))]);

		assert_eq!(service(&transport).geocode("asdkjasdkj123").await, Err(GeocodeError::NotFound));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn malformed_degrees_fail_closed() {
		let transport = Arc::new(ScriptedTransport::new());
		transport.on("geo.test", [Reply::json(200, json!([{"lat": "north", "lon": "13.0"}]))]);

		let err = service(&transport).geocode("somewhere").await.unwrap_err();
		assert!(matches!(err, GeocodeError::Network(NetworkError::ServerError { status: None, .. })));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn out_of_range_result_fails_closed() {
		let transport = Arc::new(ScriptedTransport::new());
		transport.on("geo.test", [Reply::json(200, json!([{"lat": 95.0, "lon": 13.0}]))]);

		let err = service(&transport).geocode("somewhere").await.unwrap_err();
		assert!(matches!(err, GeocodeError::Network(NetworkError::ServerError { status: None, .. })));
	}
}
