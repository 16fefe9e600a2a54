//! Service clients for the orchestrator: current position, address lookup
//! and driving routes.
//!
//! Each service decodes its provider's JSON into an explicit schema and fails
//! closed on anything unexpected. Retries and timeouts live in
//! [`wayfinder_net::NetworkClient`]; services only ever see final outcomes.

mod error;
pub mod geocode;
pub mod location;
pub mod routing;

pub use error::{GeocodeError, LocationError, RouteError};
pub use geocode::GeocodingService;
pub use location::{FixedPositionSource, IpProvider, IpProviderKind, LocationResolver, NoPositionSource, PositionSource};
pub use routing::{PathEncoding, RoutingService};
