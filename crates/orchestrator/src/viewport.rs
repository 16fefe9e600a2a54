//! Zoom input conversion and route fitting in Web Mercator.

use std::f64::consts::PI;

use wayfinder_primitives::BoundingBox;

/// Tile edge length in pixels at zoom 0.
const TILE_SIZE: f64 = 256.0;

/// Wheel delta reported per notch by most platforms.
pub const WHEEL_UNITS_PER_NOTCH: f64 = 120.0;

/// Zoom levels per wheel notch.
pub const LEVELS_PER_NOTCH: f64 = 0.5;

/// Raw zoom input from the front end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomInput {
	/// Button or keyboard step, in whole levels (`+1` in, `-1` out).
	Step(f64),
	/// Wheel angle delta, 120 units per notch; positive zooms in.
	Wheel(f64),
	/// Pinch scale factor; `2.0` doubles the scale, one level in.
	Pinch(f64),
}

impl ZoomInput {
	/// Zoom change in levels, or `None` for unusable input.
	pub fn levels(self) -> Option<f64> {
		let levels = match self {
			Self::Step(levels) => levels,
			Self::Wheel(delta) => delta / WHEEL_UNITS_PER_NOTCH * LEVELS_PER_NOTCH,
			Self::Pinch(scale) if scale > 0.0 => scale.log2(),
			Self::Pinch(_) => return None,
		};
		(levels.is_finite() && levels != 0.0).then_some(levels)
	}
}

/// Normalized Web Mercator x in `[0, 1]`.
fn mercator_x(lon: f64) -> f64 {
	(lon + 180.0) / 360.0
}

/// Normalized Web Mercator y in `[0, 1]`, 0 at the north edge.
fn mercator_y(lat: f64) -> f64 {
	let lat = lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
	(1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0
}

/// Largest zoom at which `bounds` plus `margin_px` on every side fits a
/// `width` × `height` pixel viewport, clamped to `[min, max]`.
pub fn fit_zoom(bounds: &BoundingBox, (width, height): (u32, u32), margin_px: f64, min: f64, max: f64) -> f64 {
	let avail_w = (f64::from(width) - 2.0 * margin_px).max(1.0);
	let avail_h = (f64::from(height) - 2.0 * margin_px).max(1.0);
	let dx = (mercator_x(bounds.max_lon) - mercator_x(bounds.min_lon)).abs();
	let dy = (mercator_y(bounds.min_lat) - mercator_y(bounds.max_lat)).abs();

	let fit = |avail: f64, span: f64| {
		if span > 0.0 {
			(avail / (TILE_SIZE * span)).log2()
		} else {
			f64::INFINITY
		}
	};
	let zoom = fit(avail_w, dx).min(fit(avail_h, dy));
	if zoom.is_finite() { zoom.clamp(min, max) } else { max }
}
