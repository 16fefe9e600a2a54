use wayfinder_primitives::{Coordinate, LocationFix, RouteResult};
use wayfinder_services::{GeocodeError, LocationError, RouteError};

/// User intent as seen by the engine, after input coalescing.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
	Locate,
	RouteTo(String),
	ClearRoute,
	SetDestination(String),
	/// Net zoom change in levels.
	ZoomBy(f64),
	Resize { width: u32, height: u32 },
	Shutdown,
}

/// Result of a spawned service call, tagged with its operation generation.
#[derive(Debug)]
pub(crate) enum Completion {
	Located {
		generation: u64,
		result: Result<LocationFix, LocationError>,
	},
	Geocoded {
		generation: u64,
		result: Result<Coordinate, GeocodeError>,
	},
	Routed {
		generation: u64,
		result: Result<RouteResult, RouteError>,
	},
}

/// Everything the engine task receives, on a single channel.
#[derive(Debug)]
pub(crate) enum Event {
	Intent(Intent),
	Completed(Completion),
}
