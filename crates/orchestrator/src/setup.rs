//! Wiring from [`Config`] to the engine's settings and service clients.

use std::sync::Arc;
use std::time::Duration;

use wayfinder_config::Config;
use wayfinder_net::{NetworkClient, RetryPolicy, Transport};
use wayfinder_primitives::Coordinate;
use wayfinder_services::{
	FixedPositionSource, GeocodingService, LocationResolver, NoPositionSource, PositionSource, RoutingService,
};

/// Timing and map parameters the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	/// Quiet period before a typed destination is routed.
	pub debounce: Duration,
	/// Window in which zoom inputs are summed.
	pub coalesce: Duration,
	/// Route origin and displayed position until a fix exists.
	pub default_origin: Coordinate,
	pub initial_zoom: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub fit_margin_px: f64,
	pub viewport: (u32, u32),
	/// Delay before the start-up locate; `None` disables it.
	pub auto_locate: Option<Duration>,
}

impl Default for Settings {
	fn default() -> Self {
		Self::from_config(&Config::default())
	}
}

impl Settings {
	pub fn from_config(config: &Config) -> Self {
		Self {
			debounce: config.input.debounce(),
			coalesce: config.input.coalesce(),
			default_origin: config.location.default_origin,
			initial_zoom: config.map.initial_zoom,
			min_zoom: config.map.min_zoom,
			max_zoom: config.map.max_zoom,
			fit_margin_px: config.map.fit_margin_px,
			viewport: (config.map.viewport_width, config.map.viewport_height),
			auto_locate: config
				.startup
				.auto_locate
				.then(|| config.startup.auto_locate_delay()),
		}
	}
}

/// Service clients the engine drives.
#[derive(Clone)]
pub struct Backends {
	pub resolver: Arc<LocationResolver>,
	pub geocoder: Arc<GeocodingService>,
	pub router: Arc<RoutingService>,
}

impl Backends {
	/// Builds every service on one shared transport.
	pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
		let net_cfg = &config.network;
		let net = NetworkClient::new(transport)
			.with_timeout(net_cfg.timeout())
			.with_policy(RetryPolicy {
				retries: net_cfg.retries,
				backoff_base: net_cfg.backoff(),
				jitter: net_cfg.jitter,
			});

		let native: Arc<dyn PositionSource> = match config.location.fixed_position {
			Some(position) => Arc::new(FixedPositionSource(position)),
			None => Arc::new(NoPositionSource),
		};
		let resolver = LocationResolver::new(native, net.clone())
			.with_native_timeout(config.location.native_timeout())
			.with_providers(config.services.ip_providers.clone())
			.with_request_timeout(net_cfg.ip_timeout());
		let geocoder = GeocodingService::new(net.clone(), config.services.geocoding_url.clone())
			.with_timeout(net_cfg.geocode_timeout());
		let router = RoutingService::new(net, config.services.routing_url.clone())
			.with_profile(config.services.routing_profile.clone())
			.with_encoding(config.services.route_geometry)
			.with_timeout(net_cfg.route_timeout());

		Self {
			resolver: Arc::new(resolver),
			geocoder: Arc::new(geocoder),
			router: Arc::new(router),
		}
	}
}
