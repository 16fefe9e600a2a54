use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time::sleep;
use url::Url;
use wayfinder_config::Config;
use wayfinder_net::mock::{Reply, ScriptedTransport};
use wayfinder_primitives::{BoundingBox, COORD_EPSILON, Coordinate, FixSource};
use wayfinder_services::{IpProvider, IpProviderKind};

use super::*;

const GATE: (f64, f64) = (52.5163, 13.3777);
const ALEX: (f64, f64) = (52.52, 13.405);

struct Harness {
	handle: OrchestratorHandle,
	transport: Arc<ScriptedTransport>,
}

fn harness(configure: impl FnOnce(&mut Config)) -> Harness {
	let mut config = Config::default();
	config.services.geocoding_url = Url::parse("https://geo.test/search").unwrap();
	config.services.routing_url = Url::parse("https://osrm.test/route/v1").unwrap();
	config.services.ip_providers = vec![IpProvider::new(
		IpProviderKind::IpapiCo,
		Url::parse("https://ip.test/json/").unwrap(),
	)];
	config.startup.auto_locate = false;
	configure(&mut config);

	let transport = Arc::new(ScriptedTransport::new());
	let backends = Backends::from_config(&config, transport.clone());
	let handle = OrchestratorHandle::start(backends, Settings::from_config(&config));
	Harness { handle, transport }
}

fn at_alexanderplatz(config: &mut Config) {
	config.location.fixed_position = Some(Coordinate::new(ALEX.0, ALEX.1).unwrap());
}

fn ip_reply(lat: f64, lon: f64) -> Reply {
	Reply::json(200, json!({"latitude": lat, "longitude": lon}))
}

fn gate_reply() -> Reply {
	Reply::json(
		200,
		json!([{"lat": GATE.0.to_string(), "lon": GATE.1.to_string(), "display_name": "Brandenburger Tor"}]),
	)
}

fn route_reply(distance: f64) -> Reply {
	Reply::json(
		200,
		json!({
			"code": "Ok",
			"routes": [{
				"distance": distance,
				"duration": 420.0,
				"geometry": {
					"type": "LineString",
					"coordinates": [[ALEX.1, ALEX.0], [13.3925, 52.5181], [GATE.1, GATE.0]]
				}
			}]
		}),
	)
}

async fn settle() {
	sleep(Duration::from_secs(30)).await;
}

async fn wait_for(handle: &OrchestratorHandle, pred: impl FnMut(&Snapshot) -> bool) -> Snapshot {
	let mut rx = handle.subscribe();
	let snapshot = tokio::time::timeout(Duration::from_secs(120), rx.wait_for(pred))
		.await
		.expect("state never matched")
		.expect("engine stopped")
		.clone();
	snapshot
}

async fn route_ready(handle: &OrchestratorHandle) -> Snapshot {
	wait_for(handle, |s| s.phase == Phase::RouteReady && !s.is_busy).await
}

fn drain(rx: &mut broadcast::Receiver<PropertyChange>) -> Vec<PropertyChange> {
	let mut out = Vec::new();
	while let Ok(change) = rx.try_recv() {
		out.push(change);
	}
	out
}

fn point(pair: [f64; 2]) -> Coordinate {
	Coordinate::new(pair[0], pair[1]).unwrap()
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn starts_idle_at_default_origin() {
	let h = harness(|_| {});
	let snapshot = h.handle.snapshot();

	assert_eq!(snapshot.latitude, 52.3759);
	assert_eq!(snapshot.longitude, 10.5268);
	assert_eq!(snapshot.phase, Phase::Idle);
	assert_eq!(snapshot.status, status::IDLE);
	assert_eq!(snapshot.zoom, 13.0);
	assert!(!snapshot.is_busy);
	assert!(snapshot.route_points.is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn only_latest_locate_updates_position() {
	let h = harness(|_| {});
	h.transport
		.on("ip.test", [ip_reply(48.0, 11.0).after(Duration::from_secs(2)), ip_reply(ALEX.0, ALEX.1)]);
	let mut changes = h.handle.changes();

	h.handle.locate().unwrap();
	h.handle.locate().unwrap();
	let snapshot = wait_for(&h.handle, |s| s.fix_source.is_some() && !s.is_busy).await;
	settle().await;

	assert_eq!((snapshot.latitude, snapshot.longitude), ALEX);
	assert_eq!(snapshot.status, status::LOCATED_IP);
	assert_eq!(snapshot.fix_source, Some(FixSource::IpFallback));
	assert_eq!(h.handle.snapshot(), snapshot);
	assert!(!drain(&mut changes).contains(&PropertyChange::Latitude(48.0)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn back_to_back_locates_settle_on_a_fix() {
	for _ in 0..50 {
		let h = harness(|_| {});
		h.transport
			.on("ip.test", [ip_reply(ALEX.0, ALEX.1).after(Duration::from_millis(5))]);

		h.handle.locate().unwrap();
		h.handle.locate().unwrap();
		let snapshot = wait_for(&h.handle, |s| {
			(s.fix_source.is_some() || s.last_error.is_some()) && !s.is_busy
		})
		.await;

		assert_eq!(snapshot.fix_source, Some(FixSource::IpFallback));
		assert_eq!(snapshot.last_error, None);
		assert_eq!(snapshot.status, status::LOCATED_IP);
		assert_eq!((snapshot.latitude, snapshot.longitude), ALEX);
		h.handle.shutdown().unwrap();
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn locate_failure_keeps_prior_state() {
	let h = harness(|_| {});
	h.transport.on("ip.test", [Reply::status(500)]);

	h.handle.locate().unwrap();
	let snapshot = wait_for(&h.handle, |s| s.last_error.is_some() && !s.is_busy).await;

	assert_eq!(snapshot.last_error, Some(ErrorKind::LocationUnavailable));
	assert_eq!(snapshot.status, status::LOCATION_FAILED);
	assert_eq!(snapshot.phase, Phase::Idle);
	assert_eq!((snapshot.latitude, snapshot.longitude), (52.3759, 10.5268));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn typed_destination_is_debounced() {
	let h = harness(|_| {});
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.set_destination("Bran").unwrap();
	sleep(Duration::from_millis(100)).await;
	h.handle.set_destination("Brandenburg").unwrap();
	sleep(Duration::from_millis(100)).await;
	h.handle.set_destination("Brandenburg Gate, Berlin").unwrap();
	sleep(Duration::from_millis(400)).await;

	assert_eq!(h.transport.call_count("geo.test"), 0);
	assert_eq!(h.handle.snapshot().destination, "Brandenburg Gate, Berlin");

	let snapshot = route_ready(&h.handle).await;
	settle().await;

	assert_eq!(h.transport.call_count("geo.test"), 1);
	assert!(
		h.transport.calls()[0]
			.as_str()
			.contains("q=Brandenburg+Gate%2C+Berlin")
	);
	assert_eq!(snapshot.destination, "Brandenburg Gate, Berlin");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn berlin_route_round_trip() {
	let h = harness(at_alexanderplatz);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.locate().unwrap();
	wait_for(&h.handle, |s| s.phase == Phase::Located).await;
	let mut changes = h.handle.changes();

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	let snapshot = route_ready(&h.handle).await;

	assert_eq!(snapshot.fix_source, Some(FixSource::Native));
	assert!(snapshot.route_points.len() >= 2);
	let first = point(snapshot.route_points[0]);
	let last = point(*snapshot.route_points.last().unwrap());
	assert!(first.approx_eq(&Coordinate::new(ALEX.0, ALEX.1).unwrap(), COORD_EPSILON));
	assert!(last.approx_eq(&Coordinate::new(GATE.0, GATE.1).unwrap(), COORD_EPSILON));
	assert!((1500.0..=2500.0).contains(&snapshot.route_distance));
	assert!(snapshot.route_duration > 0.0);
	assert_eq!(snapshot.status, status::ROUTE_READY);
	assert_eq!(snapshot.last_error, None);
	assert!(snapshot.zoom > 13.0, "route should be fitted, got zoom {}", snapshot.zoom);

	let phases: Vec<_> = drain(&mut changes)
		.into_iter()
		.filter_map(|c| match c {
			PropertyChange::Phase(p) => Some(p),
			_ => None,
		})
		.collect();
	assert_eq!(phases, vec![Phase::Geocoding, Phase::Routing, Phase::RouteReady]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn fitted_zoom_follows_viewport() {
	let h = harness(at_alexanderplatz);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.resize(2048, 1536).unwrap();
	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	let snapshot = route_ready(&h.handle).await;

	let points: Vec<_> = snapshot.route_points.iter().copied().map(point).collect();
	let bounds = BoundingBox::from_points(&points).unwrap();
	assert_eq!(snapshot.zoom, fit_zoom(&bounds, (2048, 1536), 48.0, 2.0, 19.0));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn repeated_route_request_is_ignored() {
	let h = harness(at_alexanderplatz);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	route_ready(&h.handle).await;
	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	settle().await;

	assert_eq!(h.transport.call_count("geo.test"), 1);
	assert_eq!(h.transport.call_count("osrm.test"), 1);
	assert_eq!(h.handle.snapshot().phase, Phase::RouteReady);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn repeated_route_request_in_flight_is_ignored() {
	let h = harness(at_alexanderplatz);
	h.transport.on("geo.test", [gate_reply().after(Duration::from_secs(2))]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	wait_for(&h.handle, |s| s.phase == Phase::Geocoding).await;
	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	route_ready(&h.handle).await;
	settle().await;

	assert_eq!(h.transport.call_count("geo.test"), 1);
	assert_eq!(h.transport.call_count("osrm.test"), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn same_destination_reroutes_after_origin_moves() {
	let h = harness(|_| {});
	h.transport.on("ip.test", [ip_reply(ALEX.0, ALEX.1)]);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	route_ready(&h.handle).await;
	h.handle.locate().unwrap();
	wait_for(&h.handle, |s| s.fix_source.is_some() && !s.is_busy).await;
	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	settle().await;

	assert_eq!(h.transport.call_count("geo.test"), 2);
	assert_eq!(h.transport.call_count("osrm.test"), 2);
	let routed_from: Vec<_> = h
		.transport
		.calls()
		.into_iter()
		.filter(|u| u.as_str().contains("osrm.test"))
		.map(|u| u.path().to_string())
		.collect();
	assert!(routed_from[0].contains("10.5268,52.3759"), "{routed_from:?}");
	assert!(routed_from[1].contains("13.405,52.52"), "{routed_from:?}");
	assert_eq!(h.handle.snapshot().phase, Phase::RouteReady);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn empty_destination_never_goes_busy() {
	let h = harness(|_| {});
	let mut changes = h.handle.changes();

	h.handle.route_to("   ").unwrap();
	let snapshot = wait_for(&h.handle, |s| s.last_error.is_some()).await;
	settle().await;

	assert_eq!(snapshot.last_error, Some(ErrorKind::EmptyInput));
	assert_eq!(snapshot.status, status::EMPTY_DESTINATION);
	assert!(h.transport.calls().is_empty());
	assert!(!drain(&mut changes).contains(&PropertyChange::IsBusy(true)));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn transient_routing_failures_are_invisible() {
	let h = harness(|c| {
		at_alexanderplatz(c);
		c.network.retries = 2;
	});
	h.transport.on("geo.test", [gate_reply()]);
	h.transport
		.on("osrm.test", [Reply::status(502), Reply::status(503), route_reply(2100.0)]);
	let mut changes = h.handle.changes();

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	let snapshot = route_ready(&h.handle).await;

	assert_eq!(h.transport.call_count("osrm.test"), 3);
	assert_eq!(snapshot.last_error, None);
	assert!(
		!drain(&mut changes)
			.iter()
			.any(|c| matches!(c, PropertyChange::LastError(Some(_))))
	);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn unknown_destination_keeps_active_route() {
	let h = harness(at_alexanderplatz);
	h.transport.on("q=asdkjasdkj123", [Reply::json(200, json!([]))]);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on("osrm.test", [route_reply(2100.0)]);

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	let before = route_ready(&h.handle).await;
	h.handle.route_to("asdkjasdkj123").unwrap();
	let after = wait_for(&h.handle, |s| s.last_error.is_some() && !s.is_busy).await;

	assert_eq!(after.last_error, Some(ErrorKind::NotFound));
	assert_eq!(after.status, status::NOT_FOUND);
	assert_eq!(after.phase, Phase::RouteReady);
	assert_eq!(after.route_points, before.route_points);
	assert_eq!(after.route_distance, before.route_distance);
	assert_eq!(h.transport.call_count("osrm.test"), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn rate_limit_has_its_own_status() {
	let h = harness(|_| {});
	h.transport.on("geo.test", [Reply::status(429)]);

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	let snapshot = wait_for(&h.handle, |s| s.last_error.is_some() && !s.is_busy).await;

	assert_eq!(snapshot.last_error, Some(ErrorKind::RateLimited));
	assert_eq!(snapshot.status, status::RATE_LIMITED);
	assert_eq!(h.transport.call_count("geo.test"), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn superseded_route_result_is_discarded() {
	let h = harness(at_alexanderplatz);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport.on(
		"osrm.test",
		[route_reply(1111.0).after(Duration::from_secs(2)), route_reply(2222.0)],
	);

	h.handle.route_to("Pariser Platz").unwrap();
	wait_for(&h.handle, |s| s.phase == Phase::Routing).await;
	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	let snapshot = route_ready(&h.handle).await;
	settle().await;

	assert_eq!(snapshot.route_distance, 2222.0);
	assert_eq!(h.handle.snapshot().route_distance, 2222.0);
	assert_eq!(h.handle.snapshot().destination, "Brandenburg Gate, Berlin");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn clear_route_cancels_in_flight_and_queued_requests() {
	let h = harness(at_alexanderplatz);
	h.transport.on("geo.test", [gate_reply()]);
	h.transport
		.on("osrm.test", [route_reply(2100.0).after(Duration::from_secs(2))]);

	h.handle.route_to("Brandenburg Gate, Berlin").unwrap();
	wait_for(&h.handle, |s| s.phase == Phase::Routing).await;
	h.handle.clear_route().unwrap();
	h.handle.set_destination("Alexanderplatz").unwrap();
	h.handle.clear_route().unwrap();
	settle().await;

	let snapshot = h.handle.snapshot();
	assert!(snapshot.route_points.is_empty());
	assert!(!snapshot.is_busy);
	assert_eq!(snapshot.status, status::ROUTE_CLEARED);
	assert_eq!(snapshot.phase, Phase::Idle);
	assert_eq!(h.transport.call_count("geo.test"), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn zoom_burst_is_applied_once_as_sum() {
	let h = harness(|_| {});
	let mut changes = h.handle.changes();

	h.handle.wheel(120.0).unwrap();
	sleep(Duration::from_millis(30)).await;
	h.handle.wheel(120.0).unwrap();
	sleep(Duration::from_millis(30)).await;
	h.handle.wheel(120.0).unwrap();
	h.handle.pinch(2.0).unwrap();
	settle().await;

	assert_eq!(h.handle.snapshot().zoom, 15.5);
	let zooms: Vec<_> = drain(&mut changes)
		.into_iter()
		.filter(|c| matches!(c, PropertyChange::Zoom(_)))
		.collect();
	assert_eq!(zooms, vec![PropertyChange::Zoom(15.5)]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn zoom_is_clamped_to_bounds() {
	let h = harness(|_| {});

	for _ in 0..10 {
		h.handle.zoom_in().unwrap();
	}
	settle().await;
	assert_eq!(h.handle.snapshot().zoom, 19.0);

	for _ in 0..30 {
		h.handle.zoom_out().unwrap();
	}
	settle().await;
	assert_eq!(h.handle.snapshot().zoom, 2.0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn auto_locates_after_startup_delay() {
	let h = harness(|c| c.startup.auto_locate = true);
	h.transport.on("ip.test", [ip_reply(ALEX.0, ALEX.1)]);

	sleep(Duration::from_millis(299)).await;
	assert_eq!(h.transport.call_count("ip.test"), 0);

	let snapshot = wait_for(&h.handle, |s| s.phase == Phase::Located).await;
	assert_eq!((snapshot.latitude, snapshot.longitude), ALEX);
	assert_eq!(h.transport.call_count("ip.test"), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn shutdown_stops_the_engine() {
	let h = harness(|_| {});

	h.handle.shutdown().unwrap();
	sleep(Duration::from_millis(10)).await;

	assert_eq!(h.handle.locate(), Err(Closed));
	assert_eq!(h.handle.wheel(120.0), Err(Closed));
}
