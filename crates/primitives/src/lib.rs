//! Core value types for location and routing: coordinates, fixes, routes.

/// Latitude/longitude pairs and great-circle math.
pub mod coordinate;
/// Resolved current-position readings.
pub mod fix;
/// Axis-aligned latitude/longitude boxes.
pub mod geometry;
/// Immutable route results.
pub mod route;

pub use coordinate::{COORD_EPSILON, Coordinate, CoordinateError};
pub use fix::{FixSource, LocationFix};
pub use geometry::BoundingBox;
pub use route::{RouteResult, RouteResultError};
