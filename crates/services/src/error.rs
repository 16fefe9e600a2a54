use thiserror::Error;
use wayfinder_net::NetworkError;

/// Failure to determine the current position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
	#[error("location permission denied")]
	PermissionDenied,
	#[error("location unavailable")]
	Unavailable,
	/// A newer resolution started before this one finished.
	#[error("location request superseded")]
	Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
	#[error("destination is empty")]
	EmptyInput,
	#[error("destination not found")]
	NotFound,
	#[error(transparent)]
	Network(#[from] NetworkError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
	/// Origin and destination coincide.
	#[error("origin and destination are the same")]
	TrivialRoute,
	#[error("no route found")]
	NoRouteFound,
	#[error(transparent)]
	Network(#[from] NetworkError),
}
