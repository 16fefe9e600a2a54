//! Driving routes from an OSRM-compatible `route/v1` endpoint.
//!
//! Both geometry encodings OSRM offers are understood. The returned path is
//! anchored at the requested origin and destination, since OSRM snaps both
//! ends to the nearest road.

mod polyline;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use wayfinder_net::{NetworkClient, NetworkError, Request, Service};
use wayfinder_primitives::{COORD_EPSILON, Coordinate, RouteResult};

use crate::RouteError;

/// Public OSRM demo server, `route/v1` service root.
pub const OSRM_ROUTE_URL: &str = "https://router.project-osrm.org/route/v1";

/// Profile used when none is configured.
pub const DEFAULT_PROFILE: &str = "driving";

/// Path encoding requested from the routing service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathEncoding {
	#[default]
	Geojson,
	/// Encoded polyline, precision 5.
	Polyline,
}

impl PathEncoding {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Geojson => "geojson",
			Self::Polyline => "polyline",
		}
	}
}

#[derive(Debug, Clone)]
pub struct RoutingService {
	net: NetworkClient,
	base: Url,
	profile: String,
	encoding: PathEncoding,
	timeout: Option<Duration>,
}

impl RoutingService {
	pub fn new(net: NetworkClient, base: Url) -> Self {
		Self {
			net,
			base,
			profile: DEFAULT_PROFILE.to_string(),
			encoding: PathEncoding::default(),
			timeout: None,
		}
	}

	pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
		self.profile = profile.into();
		self
	}

	pub fn with_encoding(mut self, encoding: PathEncoding) -> Self {
		self.encoding = encoding;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Routes with the configured profile.
	pub async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RouteResult, RouteError> {
		self.route_with_profile(origin, destination, &self.profile).await
	}

	/// Routes from `origin` to `destination` using `profile` (e.g. `driving`).
	///
	/// Coincident endpoints fail with [`RouteError::TrivialRoute`] before any
	/// request is made.
	pub async fn route_with_profile(
		&self,
		origin: Coordinate,
		destination: Coordinate,
		profile: &str,
	) -> Result<RouteResult, RouteError> {
		if origin.approx_eq(&destination, COORD_EPSILON) {
			return Err(RouteError::TrivialRoute);
		}

		let mut request = Request::get(Service::Routing, self.endpoint(origin, destination, profile)?)
			.param("overview", "full")
			.param("geometries", self.encoding.as_str());
		if let Some(timeout) = self.timeout {
			request = request.timeout(timeout);
		}

		let response = match self.net.call(&request).await {
			Ok(response) => response,
			Err(NetworkError::Rejected { status, body }) => {
				if is_no_route(&body) {
					debug!(status, "route.no_route");
					return Err(RouteError::NoRouteFound);
				}
				return Err(NetworkError::Rejected { status, body }.into());
			}
			Err(err) => return Err(err.into()),
		};

		let body: OsrmResponse = response.json()?;
		if body.code != "Ok" {
			if NO_ROUTE_CODES.contains(&body.code.as_str()) {
				debug!(code = %body.code, "route.no_route");
				return Err(RouteError::NoRouteFound);
			}
			return Err(NetworkError::schema(format!(
				"routing service answered {}: {}",
				body.code,
				body.message.unwrap_or_default()
			))
			.into());
		}
		let Some(route) = body.routes.into_iter().next() else {
			return Err(RouteError::NoRouteFound);
		};

		let path = anchor(route.geometry.points()?, origin, destination);
		let result = RouteResult::new(path, route.distance, route.duration)
			.map_err(|e| NetworkError::schema(e.to_string()))?;
		debug!(
			from = %result.origin(),
			to = %result.destination(),
			points = result.path().len(),
			distance_m = result.distance_m(),
			duration_s = result.duration_s(),
			"route.ready"
		);
		Ok(result)
	}

	fn endpoint(&self, origin: Coordinate, destination: Coordinate, profile: &str) -> Result<Url, NetworkError> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|()| NetworkError::ConnectionFailed(format!("invalid routing endpoint {}", self.base)))?
			.pop_if_empty()
			.push(profile)
			.push(&format!(
				"{},{};{},{}",
				origin.longitude(),
				origin.latitude(),
				destination.longitude(),
				destination.latitude()
			));
		Ok(url)
	}
}

const NO_ROUTE_CODES: [&str; 2] = ["NoRoute", "NoSegment"];

fn is_no_route(body: &str) -> bool {
	serde_json::from_str::<OsrmStatus>(body).is_ok_and(|s| NO_ROUTE_CODES.contains(&s.code.as_str()))
}

/// Puts `origin` first and `destination` last unless the path already
/// starts and ends there.
fn anchor(mut path: Vec<Coordinate>, origin: Coordinate, destination: Coordinate) -> Vec<Coordinate> {
	if path.first().is_none_or(|first| !first.approx_eq(&origin, COORD_EPSILON)) {
		path.insert(0, origin);
	}
	if path.last().is_none_or(|last| !last.approx_eq(&destination, COORD_EPSILON)) {
		path.push(destination);
	}
	path
}

#[derive(Debug, Deserialize)]
struct OsrmStatus {
	code: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
	code: String,
	message: Option<String>,
	#[serde(default)]
	routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
	distance: f64,
	duration: f64,
	geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OsrmGeometry {
	Encoded(String),
	LineString { coordinates: Vec<[f64; 2]> },
}

impl OsrmGeometry {
	fn points(&self) -> Result<Vec<Coordinate>, NetworkError> {
		let to_coord = |lat: f64, lon: f64| Coordinate::new(lat, lon).map_err(|e| NetworkError::schema(e.to_string()));
		match self {
			Self::Encoded(encoded) => polyline::decode(encoded, 5)
				.map_err(|e| NetworkError::schema(e.to_string()))?
				.into_iter()
				.map(|(lat, lon)| to_coord(lat, lon))
				.collect(),
			Self::LineString { coordinates } => coordinates.iter().map(|&[lon, lat]| to_coord(lat, lon)).collect(),
		}
	}
}
