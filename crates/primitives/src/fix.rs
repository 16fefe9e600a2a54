use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Strategy that produced a [`LocationFix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSource {
	/// Platform location service (GPS, Wi-Fi, OS provider).
	Native,
	/// Approximate position derived from the public IP address.
	IpFallback,
}

impl FixSource {
	/// Stable lowercase name for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Native => "native",
			Self::IpFallback => "ip_fallback",
		}
	}
}

/// One resolved current-position reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
	pub coordinate: Coordinate,
	pub source: FixSource,
	pub obtained_at: DateTime<Utc>,
}

impl LocationFix {
	/// Creates a fix stamped with the current time.
	pub fn now(coordinate: Coordinate, source: FixSource) -> Self {
		Self {
			coordinate,
			source,
			obtained_at: Utc::now(),
		}
	}
}
