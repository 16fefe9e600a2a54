//! Session state, its observable projection and per-property change events.

use serde::{Deserialize, Serialize};
use wayfinder_net::NetworkError;
use wayfinder_primitives::{Coordinate, FixSource, LocationFix, RouteResult};
use wayfinder_services::{GeocodeError, LocationError, RouteError};

/// Status texts shown to the user.
pub mod status {
	pub const IDLE: &str = "Idle";
	pub const LOCATING: &str = "Locating…";
	pub const LOCATED_NATIVE: &str = "Got location from system services.";
	pub const LOCATED_IP: &str = "Got approximate location from IP.";
	pub const LOCATION_FAILED: &str = "Could not determine location.";
	pub const LOCATION_DENIED: &str = "Location permission denied.";
	pub const EMPTY_DESTINATION: &str = "Enter a destination address.";
	pub const GEOCODING: &str = "Geocoding…";
	pub const ROUTING: &str = "Requesting route…";
	pub const ROUTE_READY: &str = "Route ready.";
	pub const NOT_FOUND: &str = "Destination not found.";
	pub const NO_ROUTE: &str = "No route found.";
	pub const TRIVIAL_ROUTE: &str = "You are already at the destination.";
	pub const ROUTE_CLEARED: &str = "Route cleared.";
	pub const RATE_LIMITED: &str = "Service is busy (rate limited). Try again later.";
	pub const TIMED_OUT: &str = "Service did not respond in time.";
	pub const OFFLINE: &str = "Could not reach the service.";
	pub const SERVICE_ERROR: &str = "Service error.";
}

/// Where the session is in the locate → geocode → route pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
	#[default]
	Idle,
	Locating,
	Located,
	Geocoding,
	Routing,
	RouteReady,
}

impl Phase {
	/// Rest states the session returns to when nothing is in flight.
	pub const fn is_stable(self) -> bool {
		matches!(self, Self::Idle | Self::Located | Self::RouteReady)
	}
}

/// Last user-visible failure, flattened across services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	PermissionDenied,
	LocationUnavailable,
	EmptyInput,
	NotFound,
	TrivialRoute,
	NoRouteFound,
	Timeout,
	ConnectionFailed,
	RateLimited,
	ServerError,
	Rejected,
}

impl ErrorKind {
	/// Status text shown for this failure.
	pub const fn status(self) -> &'static str {
		match self {
			Self::PermissionDenied => status::LOCATION_DENIED,
			Self::LocationUnavailable => status::LOCATION_FAILED,
			Self::EmptyInput => status::EMPTY_DESTINATION,
			Self::NotFound => status::NOT_FOUND,
			Self::TrivialRoute => status::TRIVIAL_ROUTE,
			Self::NoRouteFound => status::NO_ROUTE,
			Self::Timeout => status::TIMED_OUT,
			Self::ConnectionFailed => status::OFFLINE,
			Self::RateLimited => status::RATE_LIMITED,
			Self::ServerError | Self::Rejected => status::SERVICE_ERROR,
		}
	}
}

impl From<&NetworkError> for ErrorKind {
	fn from(err: &NetworkError) -> Self {
		match err {
			NetworkError::Timeout => Self::Timeout,
			NetworkError::ConnectionFailed(_) => Self::ConnectionFailed,
			NetworkError::RateLimited { .. } => Self::RateLimited,
			NetworkError::ServerError { .. } => Self::ServerError,
			NetworkError::Rejected { .. } => Self::Rejected,
		}
	}
}

impl From<&LocationError> for ErrorKind {
	fn from(err: &LocationError) -> Self {
		match err {
			LocationError::PermissionDenied => Self::PermissionDenied,
			LocationError::Unavailable | LocationError::Superseded => Self::LocationUnavailable,
		}
	}
}

impl From<&GeocodeError> for ErrorKind {
	fn from(err: &GeocodeError) -> Self {
		match err {
			GeocodeError::EmptyInput => Self::EmptyInput,
			GeocodeError::NotFound => Self::NotFound,
			GeocodeError::Network(e) => e.into(),
		}
	}
}

impl From<&RouteError> for ErrorKind {
	fn from(err: &RouteError) -> Self {
		match err {
			RouteError::TrivialRoute => Self::TrivialRoute,
			RouteError::NoRouteFound => Self::NoRouteFound,
			RouteError::Network(e) => e.into(),
		}
	}
}

/// A computed route and the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ActiveRoute {
	pub text: String,
	pub origin: Coordinate,
	pub result: RouteResult,
}

/// Mutable session aggregate, owned by the engine task.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
	pub fix: Option<LocationFix>,
	pub destination: String,
	pub route: Option<ActiveRoute>,
	pub status: String,
	pub last_error: Option<ErrorKind>,
	pub zoom: f64,
	pub viewport: (u32, u32),
}

impl SessionState {
	pub fn new(zoom: f64, viewport: (u32, u32)) -> Self {
		Self {
			fix: None,
			destination: String::new(),
			route: None,
			status: status::IDLE.to_string(),
			last_error: None,
			zoom,
			viewport,
		}
	}

	/// Phase with nothing in flight.
	pub fn stable_phase(&self) -> Phase {
		if self.route.is_some() {
			Phase::RouteReady
		} else if self.fix.is_some() {
			Phase::Located
		} else {
			Phase::Idle
		}
	}

	pub fn fail(&mut self, kind: ErrorKind) {
		self.last_error = Some(kind);
		self.status = kind.status().to_string();
	}
}

/// Read-only view of the session handed to the front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
	pub latitude: f64,
	pub longitude: f64,
	pub status: String,
	pub is_busy: bool,
	pub destination: String,
	/// `[lat, lon]` pairs; empty without a route.
	pub route_points: Vec<[f64; 2]>,
	/// Meters; zero without a route.
	pub route_distance: f64,
	/// Seconds; zero without a route.
	pub route_duration: f64,
	pub zoom: f64,
	pub phase: Phase,
	pub last_error: Option<ErrorKind>,
	pub fix_source: Option<FixSource>,
}

/// One observable property that changed, with its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "camelCase")]
pub enum PropertyChange {
	Latitude(f64),
	Longitude(f64),
	Status(String),
	IsBusy(bool),
	Destination(String),
	RoutePoints(Vec<[f64; 2]>),
	RouteDistance(f64),
	RouteDuration(f64),
	Zoom(f64),
	Phase(Phase),
	LastError(Option<ErrorKind>),
	FixSource(Option<FixSource>),
}

impl PropertyChange {
	/// Property name as exposed to the front end.
	pub const fn name(&self) -> &'static str {
		match self {
			Self::Latitude(_) => "latitude",
			Self::Longitude(_) => "longitude",
			Self::Status(_) => "status",
			Self::IsBusy(_) => "isBusy",
			Self::Destination(_) => "destination",
			Self::RoutePoints(_) => "routePoints",
			Self::RouteDistance(_) => "routeDistance",
			Self::RouteDuration(_) => "routeDuration",
			Self::Zoom(_) => "zoom",
			Self::Phase(_) => "phase",
			Self::LastError(_) => "lastError",
			Self::FixSource(_) => "fixSource",
		}
	}
}

impl Snapshot {
	/// One change per property that differs between `self` and `next`.
	pub fn diff(&self, next: &Self) -> Vec<PropertyChange> {
		let mut out = Vec::new();
		macro_rules! cmp {
			($field:ident, $variant:ident) => {
				if self.$field != next.$field {
					out.push(PropertyChange::$variant(next.$field.clone()));
				}
			};
		}
		cmp!(latitude, Latitude);
		cmp!(longitude, Longitude);
		cmp!(status, Status);
		cmp!(is_busy, IsBusy);
		cmp!(destination, Destination);
		cmp!(route_points, RoutePoints);
		cmp!(route_distance, RouteDistance);
		cmp!(route_duration, RouteDuration);
		cmp!(zoom, Zoom);
		cmp!(phase, Phase);
		cmp!(last_error, LastError);
		cmp!(fix_source, FixSource);
		out
	}
}
