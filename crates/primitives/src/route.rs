use thiserror::Error;

use crate::{BoundingBox, Coordinate};

/// Rejected [`RouteResult`] construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteResultError {
	#[error("route path needs at least 2 points, got {0}")]
	TooFewPoints(usize),
	#[error("route distance must be finite and >= 0, got {0}")]
	Distance(f64),
	#[error("route duration must be finite and >= 0, got {0}")]
	Duration(f64),
}

/// A computed route from origin to destination.
///
/// The path always has at least two points. Results are replaced wholesale
/// on recomputation and never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
	path: Vec<Coordinate>,
	distance_m: f64,
	duration_s: f64,
}

impl RouteResult {
	/// Validates and builds a route result.
	pub fn new(path: Vec<Coordinate>, distance_m: f64, duration_s: f64) -> Result<Self, RouteResultError> {
		if path.len() < 2 {
			return Err(RouteResultError::TooFewPoints(path.len()));
		}
		if !distance_m.is_finite() || distance_m < 0.0 {
			return Err(RouteResultError::Distance(distance_m));
		}
		if !duration_s.is_finite() || duration_s < 0.0 {
			return Err(RouteResultError::Duration(duration_s));
		}
		Ok(Self {
			path,
			distance_m,
			duration_s,
		})
	}

	/// Ordered path points; first is the origin, last the destination.
	pub fn path(&self) -> &[Coordinate] {
		&self.path
	}

	/// Start of the path.
	pub fn origin(&self) -> Coordinate {
		self.path[0]
	}

	/// End of the path.
	pub fn destination(&self) -> Coordinate {
		self.path[self.path.len() - 1]
	}

	/// Driving distance in meters.
	pub fn distance_m(&self) -> f64 {
		self.distance_m
	}

	/// Driving duration in seconds.
	pub fn duration_s(&self) -> f64 {
		self.duration_s
	}

	/// Path as `[lat, lon]` pairs.
	pub fn pairs(&self) -> Vec<[f64; 2]> {
		self.path.iter().map(Coordinate::to_pair).collect()
	}

	/// Bounding box of the whole path.
	pub fn bounds(&self) -> BoundingBox {
		BoundingBox::around(&self.path[0], &self.path[1..])
	}
}
