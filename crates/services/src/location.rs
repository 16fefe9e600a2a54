//! Current-position resolution.
//!
//! The platform position source is asked first under a bounded wait. When it
//! fails or times out, the configured IP-geolocation providers are tried in
//! order. Only the most recent [`LocationResolver::resolve`] call may succeed;
//! earlier ones finish with [`LocationError::Superseded`].

mod ip;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wayfinder_net::{NetworkClient, NetworkError, Request, Service};
use wayfinder_primitives::{Coordinate, FixSource, LocationFix};
use wayfinder_worker::LatestGeneration;

pub use self::ip::{IpProvider, IpProviderKind};
use crate::LocationError;

/// Default bound on the platform position source.
pub const DEFAULT_NATIVE_TIMEOUT: Duration = Duration::from_millis(3500);

/// Platform location service.
#[async_trait]
pub trait PositionSource: Send + Sync {
	async fn position(&self) -> Result<Coordinate, LocationError>;
}

/// No platform provider; always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

#[async_trait]
impl PositionSource for NoPositionSource {
	async fn position(&self) -> Result<Coordinate, LocationError> {
		Err(LocationError::Unavailable)
	}
}

/// Reports a fixed, configured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionSource(pub Coordinate);

#[async_trait]
impl PositionSource for FixedPositionSource {
	async fn position(&self) -> Result<Coordinate, LocationError> {
		Ok(self.0)
	}
}

/// Native-first, IP-fallback position resolver.
pub struct LocationResolver {
	native: Arc<dyn PositionSource>,
	native_timeout: Duration,
	net: NetworkClient,
	providers: Vec<IpProvider>,
	request_timeout: Option<Duration>,
	latest: LatestGeneration,
}

impl LocationResolver {
	pub fn new(native: Arc<dyn PositionSource>, net: NetworkClient) -> Self {
		Self {
			native,
			native_timeout: DEFAULT_NATIVE_TIMEOUT,
			net,
			providers: IpProvider::defaults(),
			request_timeout: None,
			latest: LatestGeneration::new(),
		}
	}

	pub fn with_native_timeout(mut self, timeout: Duration) -> Self {
		self.native_timeout = timeout;
		self
	}

	pub fn with_providers(mut self, providers: Vec<IpProvider>) -> Self {
		self.providers = providers;
		self
	}

	/// Per-call timeout for IP-geolocation requests; the client default otherwise.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);
		self
	}

	/// Resolves the current position, superseding any call still in flight.
	///
	/// The call claims its generation when `resolve` is invoked, not when the
	/// returned future is first polled, so call order decides which call wins.
	pub fn resolve(&self) -> impl Future<Output = Result<LocationFix, LocationError>> + Send + '_ {
		let generation = self.begin();
		self.resolve_at(generation)
	}

	/// Claims a new generation, superseding every earlier one.
	pub fn begin(&self) -> u64 {
		self.latest.begin()
	}

	/// Resolves for a generation obtained from [`Self::begin`].
	pub async fn resolve_at(&self, generation: u64) -> Result<LocationFix, LocationError> {
		let outcome = self.resolve_for(generation).await;
		if !self.latest.is_latest(generation) {
			debug!(generation, "location.superseded");
			return Err(LocationError::Superseded);
		}
		outcome
	}

	async fn resolve_for(&self, generation: u64) -> Result<LocationFix, LocationError> {
		let native_err = match tokio::time::timeout(self.native_timeout, self.native.position()).await {
			Ok(Ok(coordinate)) => {
				info!(%coordinate, "location.native");
				return Ok(LocationFix::now(coordinate, FixSource::Native));
			}
			Ok(Err(err)) => {
				debug!(error = %err, "location.native_failed");
				err
			}
			Err(_) => {
				debug!(timeout = ?self.native_timeout, "location.native_timeout");
				LocationError::Unavailable
			}
		};

		if !self.latest.is_latest(generation) {
			return Err(LocationError::Superseded);
		}

		for provider in &self.providers {
			match self.query(provider).await {
				Ok(coordinate) => {
					info!(%coordinate, provider = provider.host(), "location.ip_fallback");
					return Ok(LocationFix::now(coordinate, FixSource::IpFallback));
				}
				Err(err) => warn!(provider = provider.host(), error = %err, "location.provider_failed"),
			}
		}

		if self.providers.is_empty() && native_err == LocationError::PermissionDenied {
			return Err(LocationError::PermissionDenied);
		}
		Err(LocationError::Unavailable)
	}

	async fn query(&self, provider: &IpProvider) -> Result<Coordinate, NetworkError> {
		let mut request = Request::get(Service::IpGeolocation, provider.url.clone());
		if let Some(timeout) = self.request_timeout {
			request = request.timeout(timeout);
		}
		let response = self.net.call(&request).await?;
		provider.decode(&response)
	}
}
