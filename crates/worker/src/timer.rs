use std::time::Duration;

use tokio::task::JoinHandle;

use crate::{GenerationToken, TaskClass, spawn};

/// One-shot timer that runs a callback after a delay unless cancelled.
///
/// Cancellation is checked again right before the callback runs, so a timer
/// cancelled after its sleep elapsed but before it was polled never fires.
#[derive(Debug)]
pub struct TimerHandle {
	token: GenerationToken,
	task: JoinHandle<()>,
}

impl TimerHandle {
	/// Schedules `f` to run after `delay`.
	pub fn schedule<F>(generation: u64, delay: Duration, f: F) -> Self
	where
		F: FnOnce() + Send + 'static,
	{
		let token = GenerationToken::new(generation);
		let task_token = token.clone();
		let task = spawn(TaskClass::Timer, async move {
			tokio::select! {
				biased;
				_ = task_token.cancelled() => {}
				_ = tokio::time::sleep(delay) => {
					if !task_token.is_cancelled() {
						f();
					}
				}
			}
		});
		Self { token, task }
	}

	/// Generation this timer was scheduled under.
	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	/// Cancels the timer; the callback will not run.
	pub fn cancel(&self) {
		self.token.cancel();
		self.task.abort();
	}

	/// Returns true once cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Returns true once the timer task finished (fired or cancelled).
	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}
}
