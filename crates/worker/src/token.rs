use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic generation clock for operations, timers and fixes.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	next: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a new generation clock starting at generation 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next generation ID.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Generation-scoped cancellation token.
///
/// Cancelling marks the holder superseded; it does not interrupt work that
/// already started, it only lets that work discover it should be discarded.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	/// Creates a new generation token.
	pub fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	/// Returns generation ID.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Returns true when cancellation is requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}

/// Latest-wins guard: each `begin` supersedes every earlier generation.
#[derive(Debug, Default, Clone)]
pub struct LatestGeneration {
	clock: GenerationClock,
	current: Arc<AtomicU64>,
}

impl LatestGeneration {
	/// Creates an empty guard; no generation is current yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new generation and returns its ID.
	pub fn begin(&self) -> u64 {
		let generation = self.clock.next();
		self.current.store(generation, Ordering::Release);
		generation
	}

	/// Returns true if `generation` has not been superseded.
	pub fn is_latest(&self, generation: u64) -> bool {
		self.current.load(Ordering::Acquire) == generation
	}
}
