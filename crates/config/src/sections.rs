//! Configuration sections and their defaults.
//!
//! Every field has a default, so a file only needs the keys it changes.
//! Durations are whole milliseconds.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use wayfinder_primitives::Coordinate;
use wayfinder_services::{IpProvider, PathEncoding};

fn url(s: &str) -> Url {
	Url::parse(s).expect("built-in URLs are valid")
}

fn ms(value: u64) -> Duration {
	Duration::from_millis(value)
}

/// External service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServicesConfig {
	/// Nominatim-compatible search endpoint.
	pub geocoding_url: Url,
	/// OSRM `route/v1` service root.
	pub routing_url: Url,
	pub routing_profile: String,
	pub route_geometry: PathEncoding,
	/// IP-geolocation providers, tried in order.
	pub ip_providers: Vec<IpProvider>,
	/// Contact address sent in the User-Agent.
	pub contact_email: String,
}

impl Default for ServicesConfig {
	fn default() -> Self {
		Self {
			geocoding_url: url(wayfinder_services::geocode::NOMINATIM_SEARCH_URL),
			routing_url: url(wayfinder_services::routing::OSRM_ROUTE_URL),
			routing_profile: wayfinder_services::routing::DEFAULT_PROFILE.to_string(),
			route_geometry: PathEncoding::default(),
			ip_providers: IpProvider::defaults(),
			contact_email: "you@example.com".to_string(),
		}
	}
}

/// Timeouts and retry policy shared by all outbound calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
	pub timeout_ms: u64,
	pub geocode_timeout_ms: Option<u64>,
	pub route_timeout_ms: Option<u64>,
	pub ip_timeout_ms: Option<u64>,
	/// Retries after the first attempt.
	pub retries: u32,
	pub backoff_ms: u64,
	/// Relative backoff jitter in `[0, 1]`.
	pub jitter: f64,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			timeout_ms: 10_000,
			geocode_timeout_ms: Some(10_000),
			route_timeout_ms: Some(15_000),
			ip_timeout_ms: None,
			retries: 2,
			backoff_ms: 600,
			jitter: 0.2,
		}
	}
}

impl NetworkConfig {
	pub fn timeout(&self) -> Duration {
		ms(self.timeout_ms)
	}

	pub fn geocode_timeout(&self) -> Duration {
		ms(self.geocode_timeout_ms.unwrap_or(self.timeout_ms))
	}

	pub fn route_timeout(&self) -> Duration {
		ms(self.route_timeout_ms.unwrap_or(self.timeout_ms))
	}

	pub fn ip_timeout(&self) -> Duration {
		ms(self.ip_timeout_ms.unwrap_or(self.timeout_ms))
	}

	pub fn backoff(&self) -> Duration {
		ms(self.backoff_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationConfig {
	/// Bound on the platform position source.
	pub native_timeout_ms: u64,
	/// Shown and used as route origin until a fix exists, as `[lat, lon]`.
	pub default_origin: Coordinate,
	/// Static position reported by the platform source, as `[lat, lon]`.
	pub fixed_position: Option<Coordinate>,
}

impl Default for LocationConfig {
	fn default() -> Self {
		Self {
			native_timeout_ms: 3_500,
			default_origin: default_origin(),
			fixed_position: None,
		}
	}
}

impl LocationConfig {
	pub fn native_timeout(&self) -> Duration {
		ms(self.native_timeout_ms)
	}
}

/// Braunschweig city centre.
fn default_origin() -> Coordinate {
	Coordinate::new(52.3759, 10.5268).expect("built-in origin is in range")
}

/// Input coalescing windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
	/// Quiet period before a typed destination is routed.
	pub debounce_ms: u64,
	/// Window in which zoom inputs are summed.
	pub coalesce_ms: u64,
}

impl Default for InputConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 500,
			coalesce_ms: 100,
		}
	}
}

impl InputConfig {
	pub fn debounce(&self) -> Duration {
		ms(self.debounce_ms)
	}

	pub fn coalesce(&self) -> Duration {
		ms(self.coalesce_ms)
	}
}

/// Map presentation defaults handed to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
	pub tile_server: Url,
	pub copyright: String,
	pub high_dpi_tiles: bool,
	pub initial_zoom: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub zoom_anim_ms: u64,
	/// Padding kept around a fitted route, in pixels per side.
	pub fit_margin_px: f64,
	pub viewport_width: u32,
	pub viewport_height: u32,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			tile_server: url("https://tile.openstreetmap.org/"),
			copyright: "© OpenStreetMap contributors".to_string(),
			high_dpi_tiles: true,
			initial_zoom: 13.0,
			min_zoom: 2.0,
			max_zoom: 19.0,
			zoom_anim_ms: 150,
			fit_margin_px: 48.0,
			viewport_width: 1024,
			viewport_height: 768,
		}
	}
}

impl MapConfig {
	pub fn zoom_anim(&self) -> Duration {
		ms(self.zoom_anim_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartupConfig {
	/// Resolve the position once shortly after start-up.
	pub auto_locate: bool,
	pub auto_locate_delay_ms: u64,
}

impl Default for StartupConfig {
	fn default() -> Self {
		Self {
			auto_locate: true,
			auto_locate_delay_ms: 300,
		}
	}
}

impl StartupConfig {
	pub fn auto_locate_delay(&self) -> Duration {
		ms(self.auto_locate_delay_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
	/// `tracing` filter directive, e.g. `info` or `wayfinder_net=debug`.
	pub level: String,
	/// Log to this file instead of stderr.
	pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			file: None,
		}
	}
}
