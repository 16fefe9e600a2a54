//! The session owner.
//!
//! One task holds [`SessionState`] and is its only writer. Intents and
//! service completions arrive on the same channel and are applied in order.
//! Service calls run in their own tasks and report back as generation-tagged
//! [`Completion`]s; a completion whose generation is no longer live is
//! dropped without touching state.
//!
//! After every event the engine projects a [`Snapshot`], publishes it on the
//! watch channel and broadcasts one [`PropertyChange`] per changed property.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, WeakUnboundedSender};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, trace, warn};
use wayfinder_primitives::{COORD_EPSILON, Coordinate, FixSource};
use wayfinder_services::LocationError;
use wayfinder_worker::{GenerationClock, TaskClass, TimerHandle};

use crate::intent::{Completion, Event, Intent};
use crate::pending::{PendingOps, RouteStage};
use crate::state::{ActiveRoute, ErrorKind, Phase, PropertyChange, SessionState, Snapshot, status};
use crate::viewport::fit_zoom;
use crate::{Backends, Settings};

pub(crate) struct Engine {
	state: SessionState,
	pending: PendingOps,
	clock: GenerationClock,
	backends: Backends,
	settings: Arc<Settings>,
	events: WeakUnboundedSender<Event>,
	snapshot: watch::Sender<Snapshot>,
	changes: broadcast::Sender<PropertyChange>,
	startup: Option<TimerHandle>,
}

impl Engine {
	pub fn new(
		backends: Backends,
		settings: Arc<Settings>,
		events: WeakUnboundedSender<Event>,
		changes: broadcast::Sender<PropertyChange>,
	) -> (Self, watch::Receiver<Snapshot>) {
		let state = SessionState::new(settings.initial_zoom, settings.viewport);
		let engine = Self {
			state,
			pending: PendingOps::default(),
			clock: GenerationClock::new(),
			backends,
			settings,
			events,
			snapshot: watch::Sender::new(Snapshot::default()),
			changes,
			startup: None,
		};
		engine.snapshot.send_replace(engine.project());
		let rx = engine.snapshot.subscribe();
		(engine, rx)
	}

	pub async fn run(mut self, mut rx: UnboundedReceiver<Event>) {
		info!(origin = %self.settings.default_origin, "orchestrator.start");
		self.schedule_startup();

		while let Some(event) = rx.recv().await {
			match event {
				Event::Intent(Intent::Shutdown) => break,
				Event::Intent(intent) => self.on_intent(intent),
				Event::Completed(done) => self.on_completion(done),
			}
			self.publish();
		}

		if let Some(timer) = self.startup.take() {
			timer.cancel();
		}
		self.pending.cancel_all();
		info!("orchestrator.stop");
	}

	fn schedule_startup(&mut self) {
		let Some(delay) = self.settings.auto_locate else {
			return;
		};
		let events = self.events.clone();
		self.startup = Some(TimerHandle::schedule(self.clock.next(), delay, move || {
			if let Some(tx) = events.upgrade() {
				let _ = tx.send(Event::Intent(Intent::Locate));
			}
		}));
	}

	fn on_intent(&mut self, intent: Intent) {
		trace!(?intent, "orchestrator.intent");
		match intent {
			Intent::Locate => self.locate(),
			Intent::RouteTo(text) => self.route_to(&text),
			Intent::ClearRoute => self.clear_route(),
			Intent::SetDestination(text) => self.state.destination = text.trim().to_string(),
			Intent::ZoomBy(levels) => self.zoom_by(levels),
			Intent::Resize { width, height } => {
				if width > 0 && height > 0 {
					self.state.viewport = (width, height);
				}
			}
			Intent::Shutdown => {}
		}
	}

	fn locate(&mut self) {
		let generation = self.pending.begin_locate(self.clock.next());
		self.state.last_error = None;
		self.state.status = status::LOCATING.to_string();
		debug!(generation, "orchestrator.locate");

		let resolver = Arc::clone(&self.backends.resolver);
		let claim = resolver.begin();
		self.spawn_call(async move { resolver.resolve_at(claim).await }, move |result| Completion::Located {
			generation,
			result,
		});
	}

	fn route_to(&mut self, text: &str) {
		let text = text.trim().to_string();
		self.state.destination.clone_from(&text);
		if text.is_empty() {
			debug!("orchestrator.empty_destination");
			self.state.fail(ErrorKind::EmptyInput);
			return;
		}

		let origin = self.origin();
		let same = |t: &str, o: &Coordinate| t == text && o.approx_eq(&origin, COORD_EPSILON);
		if self.pending.route().is_some_and(|op| same(&op.text, &op.origin)) {
			debug!(destination = %text, "orchestrator.route_in_flight");
			return;
		}
		if self.state.route.as_ref().is_some_and(|r| same(&r.text, &r.origin)) {
			debug!(destination = %text, "orchestrator.route_unchanged");
			if self.pending.cancel_route() {
				self.state.status = status::ROUTE_READY.to_string();
			}
			return;
		}

		let generation = self.pending.begin_route(self.clock.next(), text.clone(), origin);
		self.state.last_error = None;
		self.state.status = status::GEOCODING.to_string();
		debug!(generation, destination = %text, %origin, "orchestrator.route");

		let geocoder = Arc::clone(&self.backends.geocoder);
		self.spawn_call(async move { geocoder.geocode(&text).await }, move |result| {
			Completion::Geocoded { generation, result }
		});
	}

	fn clear_route(&mut self) {
		let cancelled = self.pending.cancel_route();
		let had_route = self.state.route.take().is_some();
		debug!(cancelled, had_route, "orchestrator.clear_route");
		self.state.status = status::ROUTE_CLEARED.to_string();
	}

	fn zoom_by(&mut self, levels: f64) {
		let zoom = (self.state.zoom + levels).clamp(self.settings.min_zoom, self.settings.max_zoom);
		trace!(levels, from = self.state.zoom, to = zoom, "orchestrator.zoom");
		self.state.zoom = zoom;
	}

	fn on_completion(&mut self, done: Completion) {
		match done {
			Completion::Located { generation, result } => {
				if !self.pending.finish_locate(generation) {
					debug!(generation, "orchestrator.stale_result");
					return;
				}
				match result {
					Ok(fix) => {
						let moved_m = self.state.fix.map(|prev| prev.coordinate.haversine_m(&fix.coordinate));
						info!(
							coordinate = %fix.coordinate,
							source = fix.source.as_str(),
							moved_m,
							"orchestrator.located"
						);
						self.state.status = match fix.source {
							FixSource::Native => status::LOCATED_NATIVE,
							FixSource::IpFallback => status::LOCATED_IP,
						}
						.to_string();
						self.state.fix = Some(fix);
					}
					Err(LocationError::Superseded) => {
						warn!(generation, "orchestrator.locate_superseded");
						self.state.fail(ErrorKind::LocationUnavailable);
					}
					Err(err) => {
						warn!(error = %err, "orchestrator.locate_failed");
						self.state.fail((&err).into());
					}
				}
			}
			Completion::Geocoded { generation, result } => {
				let Some(op) = self.pending.route_at(generation, RouteStage::Geocoding) else {
					debug!(generation, "orchestrator.stale_result");
					return;
				};
				match result {
					Ok(destination) => {
						op.stage = RouteStage::Routing;
						let origin = op.origin;
						self.state.status = status::ROUTING.to_string();
						debug!(generation, %destination, "orchestrator.geocoded");

						let router = Arc::clone(&self.backends.router);
						self.spawn_call(async move { router.route(origin, destination).await }, move |result| {
							Completion::Routed { generation, result }
						});
					}
					Err(err) => {
						warn!(error = %err, "orchestrator.geocode_failed");
						self.pending.cancel_route();
						self.state.fail((&err).into());
					}
				}
			}
			Completion::Routed { generation, result } => {
				let Some(op) = self.pending.take_route(generation, RouteStage::Routing) else {
					debug!(generation, "orchestrator.stale_result");
					return;
				};
				match result {
					Ok(route) => {
						let settings = &self.settings;
						self.state.zoom = fit_zoom(
							&route.bounds(),
							self.state.viewport,
							settings.fit_margin_px,
							settings.min_zoom,
							settings.max_zoom,
						);
						info!(
							destination = %op.text,
							distance_m = route.distance_m(),
							duration_s = route.duration_s(),
							zoom = self.state.zoom,
							"orchestrator.route_ready"
						);
						self.state.route = Some(ActiveRoute {
							text: op.text,
							origin: op.origin,
							result: route,
						});
						self.state.status = status::ROUTE_READY.to_string();
					}
					Err(err) => {
						warn!(error = %err, "orchestrator.route_failed");
						self.state.fail((&err).into());
					}
				}
			}
		}
	}

	/// Runs `call` on a network task and feeds its output back as an event.
	fn spawn_call<F, T>(&self, call: F, wrap: impl FnOnce(T) -> Completion + Send + 'static)
	where
		F: Future<Output = T> + Send + 'static,
		T: Send + 'static,
	{
		let Some(tx) = self.events.upgrade() else {
			debug!("orchestrator.detached");
			return;
		};
		wayfinder_worker::spawn(TaskClass::Network, async move {
			let out = call.await;
			let _ = tx.send(Event::Completed(wrap(out)));
		});
	}

	fn origin(&self) -> Coordinate {
		self.state
			.fix
			.map_or(self.settings.default_origin, |fix| fix.coordinate)
	}

	fn phase(&self) -> Phase {
		match self.pending.route().map(|op| op.stage) {
			Some(RouteStage::Geocoding) => Phase::Geocoding,
			Some(RouteStage::Routing) => Phase::Routing,
			None if self.pending.is_locating() => Phase::Locating,
			None => self.state.stable_phase(),
		}
	}

	fn project(&self) -> Snapshot {
		let position = self.origin();
		let (route_points, route_distance, route_duration) = match &self.state.route {
			Some(active) => (
				active.result.pairs(),
				active.result.distance_m(),
				active.result.duration_s(),
			),
			None => (Vec::new(), 0.0, 0.0),
		};
		Snapshot {
			latitude: position.latitude(),
			longitude: position.longitude(),
			status: self.state.status.clone(),
			is_busy: self.pending.is_busy(),
			destination: self.state.destination.clone(),
			route_points,
			route_distance,
			route_duration,
			zoom: self.state.zoom,
			phase: self.phase(),
			last_error: self.state.last_error,
			fix_source: self.state.fix.map(|fix| fix.source),
		}
	}

	fn publish(&self) {
		let next = self.project();
		let changes = self.snapshot.borrow().diff(&next);
		if changes.is_empty() {
			return;
		}
		self.snapshot.send_replace(next);
		for change in changes {
			trace!(property = change.name(), "orchestrator.change");
			let _ = self.changes.send(change);
		}
	}
}
