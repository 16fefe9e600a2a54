/// Execution classes used for task spawning and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The session owner loop and other latency-sensitive UI-facing work.
	Interactive,
	/// Outbound service calls (geolocation, geocoding, routing).
	Network,
	/// Debounce, coalesce and delay timers.
	Timer,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Network => "network",
			Self::Timer => "timer",
		}
	}
}
