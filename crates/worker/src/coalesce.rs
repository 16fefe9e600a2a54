//! Keyed request coalescing for bursty user input.
//!
//! A [`Coalescer`] holds at most one queued value per key. Each submission
//! restarts the key's quiet-period timer; when the timer elapses without a
//! newer submission the queued value is handed to the sink exactly once.
//!
//! Two policies cover the input kinds the session sees:
//!
//! * [`CoalescePolicy::Replace`] (debounce-on-change): the newest value wins.
//!   Used for destination typing and repeated route requests.
//! * [`CoalescePolicy::Accumulate`] (coalesce-on-burst): values are merged,
//!   e.g. summed wheel/pinch zoom deltas.
//!
//! The final intent of a burst is never dropped, only delayed; intermediate
//! values are merged or replaced. Timer-driven delivery re-checks the slot's
//! generation so a superseded timer cannot deliver.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::{GenerationClock, TimerHandle};

type MergeFn<V> = Arc<dyn Fn(V, V) -> V + Send + Sync>;
type SinkFn<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

/// How a new submission combines with an already queued value.
pub enum CoalescePolicy<V> {
	/// Keep only the newest value.
	Replace,
	/// Merge the queued value with the new one.
	Accumulate(MergeFn<V>),
}

impl<V> Clone for CoalescePolicy<V> {
	fn clone(&self) -> Self {
		match self {
			Self::Replace => Self::Replace,
			Self::Accumulate(f) => Self::Accumulate(Arc::clone(f)),
		}
	}
}

impl<V> CoalescePolicy<V> {
	fn merge(&self, queued: V, incoming: V) -> V {
		match self {
			Self::Replace => incoming,
			Self::Accumulate(f) => f(queued, incoming),
		}
	}
}

/// Outcome of [`Coalescer::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// No value was queued for the key; a new timer started.
	Scheduled,
	/// A queued value was replaced or merged and its timer restarted.
	Coalesced,
}

struct Slot<V> {
	value: V,
	timer: TimerHandle,
	merged: usize,
}

struct Inner<K, V> {
	policy: CoalescePolicy<V>,
	clock: GenerationClock,
	slots: Mutex<HashMap<K, Slot<V>>>,
	sink: SinkFn<K, V>,
}

/// Keyed debounce/coalesce scheduler delivering into a sink.
pub struct Coalescer<K, V> {
	inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for Coalescer<K, V> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<K, V> Coalescer<K, V>
where
	K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
	V: Send + 'static,
{
	/// Creates a coalescer with an explicit policy.
	pub fn new(policy: CoalescePolicy<V>, sink: impl Fn(K, V) + Send + Sync + 'static) -> Self {
		Self {
			inner: Arc::new(Inner {
				policy,
				clock: GenerationClock::new(),
				slots: Mutex::new(HashMap::new()),
				sink: Arc::new(sink),
			}),
		}
	}

	/// Debounce-on-change: the newest value wins.
	pub fn debounce(sink: impl Fn(K, V) + Send + Sync + 'static) -> Self {
		Self::new(CoalescePolicy::Replace, sink)
	}

	/// Coalesce-on-burst: queued values are merged with `merge`.
	pub fn accumulate(
		merge: impl Fn(V, V) -> V + Send + Sync + 'static,
		sink: impl Fn(K, V) + Send + Sync + 'static,
	) -> Self {
		Self::new(CoalescePolicy::Accumulate(Arc::new(merge)), sink)
	}

	/// Queues `value` under `key`, delivering it after `quiet` of inactivity.
	pub fn submit(&self, key: K, value: V, quiet: Duration) -> SubmitOutcome {
		let mut slots = self.inner.slots.lock();
		// Scheduled under the lock so a zero-length timer cannot observe the
		// slot before it is installed.
		let generation = self.inner.clock.next();
		let weak = Arc::downgrade(&self.inner);
		let timer_key = key.clone();
		let timer = TimerHandle::schedule(generation, quiet, move || fire(weak, timer_key, generation));

		match slots.remove(&key) {
			Some(prev) => {
				prev.timer.cancel();
				let merged = prev.merged + 1;
				let value = self.inner.policy.merge(prev.value, value);
				trace!(key = ?key, merged, generation, "coalesce.merge");
				slots.insert(key, Slot { value, timer, merged });
				SubmitOutcome::Coalesced
			}
			None => {
				trace!(key = ?key, generation, "coalesce.schedule");
				slots.insert(key, Slot { value, timer, merged: 1 });
				SubmitOutcome::Scheduled
			}
		}
	}

	/// Cancels the key's timer and drops its queued value.
	///
	/// Returns true if a value was queued.
	pub fn cancel(&self, key: &K) -> bool {
		let removed = self.inner.slots.lock().remove(key);
		match removed {
			Some(slot) => {
				slot.timer.cancel();
				trace!(key = ?key, merged = slot.merged, "coalesce.cancel");
				true
			}
			None => false,
		}
	}

	/// Delivers the key's queued value immediately.
	///
	/// Returns true if a value was delivered.
	pub fn flush(&self, key: &K) -> bool {
		let removed = self.inner.slots.lock().remove(key);
		match removed {
			Some(slot) => {
				slot.timer.cancel();
				(self.inner.sink)(key.clone(), slot.value);
				true
			}
			None => false,
		}
	}

	/// Returns true if a value is queued under `key`.
	pub fn is_pending(&self, key: &K) -> bool {
		self.inner.slots.lock().contains_key(key)
	}

	/// Number of keys with queued values.
	pub fn pending_len(&self) -> usize {
		self.inner.slots.lock().len()
	}

	/// Cancels every queued value.
	pub fn cancel_all(&self) {
		let drained: Vec<_> = self.inner.slots.lock().drain().collect();
		for (_, slot) in drained {
			slot.timer.cancel();
		}
	}
}

fn fire<K, V>(weak: Weak<Inner<K, V>>, key: K, generation: u64)
where
	K: Eq + Hash + Debug,
{
	let Some(inner) = weak.upgrade() else {
		return;
	};
	let taken = {
		let mut slots = inner.slots.lock();
		match slots.get(&key) {
			Some(slot) if slot.timer.generation() == generation => slots.remove(&key),
			_ => None,
		}
	};
	let Some(slot) = taken else {
		trace!(key = ?key, generation, "coalesce.stale_timer");
		return;
	};
	trace!(key = ?key, merged = slot.merged, generation, "coalesce.deliver");
	(inner.sink)(key, slot.value);
}
