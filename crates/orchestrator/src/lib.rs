//! Location & routing orchestrator.
//!
//! Sequences current-position resolution, geocoding and routing for a
//! reactive front end. The front end talks to an [`OrchestratorHandle`]:
//! it forwards intents and reads state through a [`Snapshot`] watch channel
//! or a stream of [`PropertyChange`]s. All state lives in a single engine
//! task; service calls never block intent handling.

mod engine;
mod handle;
mod intent;
mod pending;
mod setup;
mod state;
mod viewport;

pub use handle::{Closed, OrchestratorHandle};
pub use intent::Intent;
pub use setup::{Backends, Settings};
pub use state::{ErrorKind, Phase, PropertyChange, Snapshot, status};
pub use viewport::{LEVELS_PER_NOTCH, WHEEL_UNITS_PER_NOTCH, ZoomInput, fit_zoom};

#[cfg(test)]
mod tests;
