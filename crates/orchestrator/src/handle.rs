use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use wayfinder_worker::{Coalescer, TaskClass};

use crate::engine::Engine;
use crate::intent::{Event, Intent};
use crate::state::{PropertyChange, Snapshot};
use crate::viewport::ZoomInput;
use crate::{Backends, Settings};

/// Capacity of the property-change broadcast; slow consumers see `Lagged`.
const CHANGE_CAPACITY: usize = 256;

/// The engine task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("orchestrator has shut down")]
pub struct Closed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum InputKey {
	Destination,
	Zoom,
}

/// Front-end handle: forwards intents and exposes observable state.
///
/// Cheap to clone. Destination text is debounced and zoom input is summed
/// per burst before reaching the engine; everything else is forwarded as is.
#[derive(Clone)]
pub struct OrchestratorHandle {
	events: mpsc::UnboundedSender<Event>,
	snapshot: watch::Receiver<Snapshot>,
	changes: broadcast::Sender<PropertyChange>,
	routes: Coalescer<InputKey, String>,
	zoom: Coalescer<InputKey, f64>,
	settings: Arc<Settings>,
}

impl OrchestratorHandle {
	/// Spawns the engine task and returns a handle to it.
	pub fn start(backends: Backends, settings: Settings) -> Self {
		let settings = Arc::new(settings);
		let (events, rx) = mpsc::unbounded_channel();
		let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
		let (engine, snapshot) = Engine::new(backends, Arc::clone(&settings), events.downgrade(), changes.clone());
		wayfinder_worker::spawn(TaskClass::Interactive, engine.run(rx));

		let tx = events.clone();
		let routes = Coalescer::debounce(move |_, text| {
			let _ = tx.send(Event::Intent(Intent::RouteTo(text)));
		});
		let tx = events.clone();
		let zoom = Coalescer::accumulate(
			|a: f64, b: f64| a + b,
			move |_, levels| {
				let _ = tx.send(Event::Intent(Intent::ZoomBy(levels)));
			},
		);

		Self {
			events,
			snapshot,
			changes,
			routes,
			zoom,
			settings,
		}
	}

	fn send(&self, intent: Intent) -> Result<(), Closed> {
		self.events.send(Event::Intent(intent)).map_err(|_| Closed)
	}

	fn ensure_open(&self) -> Result<(), Closed> {
		if self.events.is_closed() { Err(Closed) } else { Ok(()) }
	}

	/// Resolves the current position, superseding any locate in flight.
	pub fn locate(&self) -> Result<(), Closed> {
		self.send(Intent::Locate)
	}

	/// Routes to `text` now, replacing any queued typed destination.
	pub fn route_to(&self, text: impl Into<String>) -> Result<(), Closed> {
		self.routes.cancel(&InputKey::Destination);
		self.send(Intent::RouteTo(text.into()))
	}

	/// Updates the destination text and routes to it once typing pauses.
	pub fn set_destination(&self, text: impl Into<String>) -> Result<(), Closed> {
		let text = text.into();
		self.send(Intent::SetDestination(text.clone()))?;
		self.routes.submit(InputKey::Destination, text, self.settings.debounce);
		Ok(())
	}

	/// Drops the route, any request in flight and any queued destination.
	pub fn clear_route(&self) -> Result<(), Closed> {
		self.routes.cancel(&InputKey::Destination);
		self.send(Intent::ClearRoute)
	}

	pub fn zoom_in(&self) -> Result<(), Closed> {
		self.zoom(ZoomInput::Step(1.0))
	}

	pub fn zoom_out(&self) -> Result<(), Closed> {
		self.zoom(ZoomInput::Step(-1.0))
	}

	/// Raw wheel angle delta, 120 units per notch.
	pub fn wheel(&self, delta: f64) -> Result<(), Closed> {
		self.zoom(ZoomInput::Wheel(delta))
	}

	/// Pinch scale factor relative to the gesture start.
	pub fn pinch(&self, scale: f64) -> Result<(), Closed> {
		self.zoom(ZoomInput::Pinch(scale))
	}

	/// Queues a zoom input; a burst is applied once as its sum.
	pub fn zoom(&self, input: ZoomInput) -> Result<(), Closed> {
		self.ensure_open()?;
		if let Some(levels) = input.levels() {
			self.zoom.submit(InputKey::Zoom, levels, self.settings.coalesce);
		}
		Ok(())
	}

	/// Viewport size in pixels, used to fit routes.
	pub fn resize(&self, width: u32, height: u32) -> Result<(), Closed> {
		self.send(Intent::Resize { width, height })
	}

	/// Current observable state.
	pub fn snapshot(&self) -> Snapshot {
		self.snapshot.borrow().clone()
	}

	/// Snapshot subscription, updated after every state change.
	pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
		self.snapshot.clone()
	}

	/// Stream of per-property changes from now on.
	pub fn changes(&self) -> broadcast::Receiver<PropertyChange> {
		self.changes.subscribe()
	}

	/// Drops queued input and stops the engine.
	pub fn shutdown(&self) -> Result<(), Closed> {
		self.routes.cancel_all();
		self.zoom.cancel_all();
		self.send(Intent::Shutdown)
	}
}
