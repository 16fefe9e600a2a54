use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance in degrees under which two coordinates are the same place.
///
/// Roughly one meter at the equator.
pub const COORD_EPSILON: f64 = 1e-5;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Rejected coordinate construction.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
	/// Latitude outside `[-90, 90]` or not finite.
	#[error("latitude {0} out of range [-90, 90]")]
	Latitude(f64),
	/// Longitude outside `[-180, 180]` or not finite.
	#[error("longitude {0} out of range [-180, 180]")]
	Longitude(f64),
}

/// A WGS84 position in decimal degrees.
///
/// Immutable once constructed; both components are range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
	latitude: f64,
	longitude: f64,
}

impl Coordinate {
	/// Creates a coordinate, validating both components.
	pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
		if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
			return Err(CoordinateError::Latitude(latitude));
		}
		if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
			return Err(CoordinateError::Longitude(longitude));
		}
		Ok(Self { latitude, longitude })
	}

	/// Latitude in degrees.
	#[inline]
	pub const fn latitude(&self) -> f64 {
		self.latitude
	}

	/// Longitude in degrees.
	#[inline]
	pub const fn longitude(&self) -> f64 {
		self.longitude
	}

	/// Returns `[lat, lon]`, the pair layout the front end renders.
	#[inline]
	pub const fn to_pair(&self) -> [f64; 2] {
		[self.latitude, self.longitude]
	}

	/// Returns true if both components differ by at most `epsilon` degrees.
	pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
		(self.latitude - other.latitude).abs() <= epsilon && (self.longitude - other.longitude).abs() <= epsilon
	}

	/// Great-circle distance to `other` in meters (haversine).
	pub fn haversine_m(&self, other: &Self) -> f64 {
		let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
		let dlat = lat2 - lat1;
		let dlon = (other.longitude - self.longitude).to_radians();
		let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
		2.0 * EARTH_RADIUS_M * a.sqrt().asin()
	}
}

impl TryFrom<[f64; 2]> for Coordinate {
	type Error = CoordinateError;

	fn try_from([latitude, longitude]: [f64; 2]) -> Result<Self, Self::Error> {
		Self::new(latitude, longitude)
	}
}

impl From<Coordinate> for [f64; 2] {
	fn from(c: Coordinate) -> Self {
		c.to_pair()
	}
}

impl std::fmt::Display for Coordinate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
	}
}
