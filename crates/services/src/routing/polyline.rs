//! Google encoded polyline decoding.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolylineError {
	#[error("polyline truncated at byte {0}")]
	Truncated(usize),
	#[error("invalid polyline byte {byte:#04x} at {at}")]
	InvalidByte { byte: u8, at: usize },
	#[error("polyline coordinate overflows at byte {0}")]
	Overflow(usize),
}

/// Decodes an encoded polyline into `(latitude, longitude)` pairs.
///
/// `precision` is the number of decimal digits, 5 for OSRM and Google.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<(f64, f64)>, PolylineError> {
	let factor = 10f64.powi(precision as i32);
	let bytes = encoded.as_bytes();
	let mut points = Vec::with_capacity(bytes.len() / 4);
	let (mut lat, mut lon) = (0i64, 0i64);
	let mut pos = 0;

	while pos < bytes.len() {
		lat = lat
			.checked_add(next_delta(bytes, &mut pos)?)
			.ok_or(PolylineError::Overflow(pos))?;
		lon = lon
			.checked_add(next_delta(bytes, &mut pos)?)
			.ok_or(PolylineError::Overflow(pos))?;
		points.push((lat as f64 / factor, lon as f64 / factor));
	}
	Ok(points)
}

fn next_delta(bytes: &[u8], pos: &mut usize) -> Result<i64, PolylineError> {
	let mut result = 0i64;
	let mut shift = 0u32;
	loop {
		let Some(&byte) = bytes.get(*pos) else {
			return Err(PolylineError::Truncated(*pos));
		};
		if !(63..127).contains(&byte) || shift > 60 {
			return Err(PolylineError::InvalidByte { byte, at: *pos });
		}
		*pos += 1;
		let chunk = i64::from(byte - 63);
		result |= (chunk & 0x1f) << shift;
		shift += 5;
		if chunk < 0x20 {
			break;
		}
	}
	Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
