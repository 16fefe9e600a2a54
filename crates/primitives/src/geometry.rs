use crate::Coordinate;

/// Axis-aligned box in degrees, inclusive on all edges.
///
/// Does not handle paths crossing the antimeridian; such a path yields a box
/// spanning nearly the full longitude range, which still contains every point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
	pub min_lat: f64,
	pub min_lon: f64,
	pub max_lat: f64,
	pub max_lon: f64,
}

impl BoundingBox {
	/// Smallest box containing every point, or `None` for an empty input.
	pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
		let mut iter = points.into_iter();
		let first = iter.next()?;
		Some(Self::around(first, iter))
	}

	/// Smallest box containing `first` and every point of `rest`.
	pub fn around<'a>(first: &Coordinate, rest: impl IntoIterator<Item = &'a Coordinate>) -> Self {
		let mut bbox = Self {
			min_lat: first.latitude(),
			min_lon: first.longitude(),
			max_lat: first.latitude(),
			max_lon: first.longitude(),
		};
		for p in rest {
			bbox.min_lat = bbox.min_lat.min(p.latitude());
			bbox.max_lat = bbox.max_lat.max(p.latitude());
			bbox.min_lon = bbox.min_lon.min(p.longitude());
			bbox.max_lon = bbox.max_lon.max(p.longitude());
		}
		bbox
	}
}
