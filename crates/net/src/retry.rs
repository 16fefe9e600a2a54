use std::time::Duration;

use rand::Rng;

/// Retry budget and backoff shape for transient failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
	/// Extra attempts after the first one.
	pub retries: u32,
	/// Delay before the first retry; doubles on every further retry.
	pub backoff_base: Duration,
	/// Maximum relative jitter applied to each delay, e.g. `0.2` for ±20%.
	pub jitter: f64,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			retries: 2,
			backoff_base: Duration::from_millis(600),
			jitter: 0.2,
		}
	}
}

impl RetryPolicy {
	/// Total attempts including the first.
	pub fn attempts(&self) -> u32 {
		self.retries.saturating_add(1)
	}

	/// Backoff before retry number `attempt` (0-based) for a jitter sample
	/// `unit` in `[-1, 1]`: `base * 2^attempt * (1 + unit * jitter)`.
	pub fn delay(&self, attempt: u32, unit: f64) -> Duration {
		let exp = 2f64.powi(attempt.min(16) as i32);
		let factor = 1.0 + unit.clamp(-1.0, 1.0) * self.jitter;
		let nanos = self.backoff_base.as_nanos() as f64 * exp * factor.max(0.0);
		Duration::from_nanos(nanos.round().min(u64::MAX as f64) as u64)
	}

	/// Backoff with a random jitter sample.
	pub fn sample_delay(&self, attempt: u32) -> Duration {
		let unit = rand::thread_rng().gen_range(-1.0..=1.0);
		self.delay(attempt, unit)
	}
}
