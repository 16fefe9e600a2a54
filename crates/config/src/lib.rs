//! Configuration for wayfinder.
//!
//! Configuration is written in TOML and loaded once at start-up. Every key is
//! optional; a file overlays the built-in defaults section by section.
//!
//! # Configuration Files
//!
//! The file is looked up in this order, first match wins:
//!
//! 1. an explicit path (the `--config` flag)
//! 2. the `WAYFINDER_CONFIG` environment variable
//! 3. `<config dir>/wayfinder/config.toml` (e.g. `~/.config/wayfinder/config.toml`)
//!
//! An explicit or environment path must exist. The per-user file is optional;
//! without it the defaults apply.
//!
//! ```toml
//! [services]
//! contact_email = "maps@example.org"
//! route_geometry = "polyline"
//!
//! [network]
//! retries = 2
//! backoff_ms = 600
//!
//! [location]
//! default_origin = [52.3759, 10.5268]
//!
//! [input]
//! debounce_ms = 500
//! ```

pub mod error;
pub mod sections;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use error::{ConfigError, Result};
pub use sections::{InputConfig, LocationConfig, LoggingConfig, MapConfig, NetworkConfig, ServicesConfig, StartupConfig};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "WAYFINDER_CONFIG";

/// Complete, validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub services: ServicesConfig,
	pub network: NetworkConfig,
	pub location: LocationConfig,
	pub input: InputConfig,
	pub map: MapConfig,
	pub startup: StartupConfig,
	pub logging: LoggingConfig,
}

/// Where a configuration file path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
	Flag(PathBuf),
	Env(PathBuf),
	UserDir(PathBuf),
}

impl ConfigSource {
	pub fn path(&self) -> &Path {
		match self {
			Self::Flag(p) | Self::Env(p) | Self::UserDir(p) => p,
		}
	}

	/// Whether a missing file at this location is an error.
	pub fn required(&self) -> bool {
		!matches!(self, Self::UserDir(_))
	}

	/// Picks the configuration path from the flag, environment and user
	/// config directory, in that order.
	pub fn resolve(explicit: Option<&Path>, env: Option<OsString>, config_dir: Option<PathBuf>) -> Option<Self> {
		if let Some(path) = explicit {
			return Some(Self::Flag(path.to_path_buf()));
		}
		if let Some(path) = env.filter(|v| !v.is_empty()) {
			return Some(Self::Env(PathBuf::from(path)));
		}
		config_dir.map(|dir| Self::UserDir(dir.join("wayfinder").join("config.toml")))
	}
}

impl Config {
	/// Parses and validates a TOML string.
	pub fn parse(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Loads from `source`, falling back to defaults when an optional file
	/// does not exist.
	pub fn load_from(source: Option<&ConfigSource>) -> Result<Self> {
		match source {
			Some(source) if source.required() || source.path().exists() => Self::load(source.path()),
			_ => Ok(Self::default()),
		}
	}

	/// Resolves the configuration path from the process environment and loads it.
	pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<ConfigSource>)> {
		let source = ConfigSource::resolve(explicit, std::env::var_os(CONFIG_ENV), dirs::config_dir());
		let config = Self::load_from(source.as_ref())?;
		Ok((config, source))
	}

	/// Checks cross-field constraints serde cannot express.
	pub fn validate(&self) -> Result<()> {
		let services = &self.services;
		check_url("services.geocoding_url", &services.geocoding_url)?;
		check_url("services.routing_url", &services.routing_url)?;
		for (i, provider) in services.ip_providers.iter().enumerate() {
			check_url(&format!("services.ip_providers[{i}].url"), &provider.url)?;
		}
		check_url("map.tile_server", &self.map.tile_server)?;
		if services.routing_profile.trim().is_empty() {
			return invalid("services.routing_profile", "must not be empty");
		}

		let net = &self.network;
		for (field, value) in [
			("network.timeout_ms", Some(net.timeout_ms)),
			("network.geocode_timeout_ms", net.geocode_timeout_ms),
			("network.route_timeout_ms", net.route_timeout_ms),
			("network.ip_timeout_ms", net.ip_timeout_ms),
			("location.native_timeout_ms", Some(self.location.native_timeout_ms)),
		] {
			if value == Some(0) {
				return invalid(field, "must be greater than zero");
			}
		}
		if !(0.0..=1.0).contains(&net.jitter) {
			return invalid("network.jitter", format!("{} is outside [0, 1]", net.jitter));
		}

		let map = &self.map;
		if !map.min_zoom.is_finite() || !map.max_zoom.is_finite() || map.min_zoom > map.max_zoom {
			return invalid(
				"map.min_zoom",
				format!("zoom bounds [{}, {}] are not an interval", map.min_zoom, map.max_zoom),
			);
		}
		if !(map.min_zoom..=map.max_zoom).contains(&map.initial_zoom) {
			return invalid(
				"map.initial_zoom",
				format!("{} is outside [{}, {}]", map.initial_zoom, map.min_zoom, map.max_zoom),
			);
		}
		if !map.fit_margin_px.is_finite() || map.fit_margin_px < 0.0 {
			return invalid("map.fit_margin_px", "must be a non-negative number");
		}
		if map.viewport_width == 0 || map.viewport_height == 0 {
			return invalid("map.viewport_width", "viewport must have a non-zero size");
		}
		Ok(())
	}
}

fn check_url(field: &str, url: &url::Url) -> Result<()> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() {
		Ok(())
	} else {
		Err(ConfigError::InvalidUrl {
			field: field.to_string(),
			url: url.to_string(),
		})
	}
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Result<()> {
	Err(ConfigError::InvalidValue {
		field,
		reason: reason.into(),
	})
}

#[cfg(test)]
mod tests;
