//! Outstanding operations, at most one live per kind.

use wayfinder_primitives::Coordinate;
use wayfinder_worker::GenerationToken;

/// Stage of an in-flight route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteStage {
	Geocoding,
	Routing,
}

#[derive(Debug)]
pub(crate) struct RouteOp {
	pub token: GenerationToken,
	pub text: String,
	pub origin: Coordinate,
	pub stage: RouteStage,
}

/// Live operation tokens. Starting an operation cancels the previous one of
/// the same kind; completions only apply while their token is live.
#[derive(Debug, Default)]
pub(crate) struct PendingOps {
	locate: Option<GenerationToken>,
	route: Option<RouteOp>,
}

impl PendingOps {
	pub fn begin_locate(&mut self, generation: u64) -> u64 {
		if let Some(prev) = self.locate.replace(GenerationToken::new(generation)) {
			prev.cancel();
		}
		generation
	}

	/// Consumes the live locate token if it matches `generation`.
	pub fn finish_locate(&mut self, generation: u64) -> bool {
		match &self.locate {
			Some(token) if token.generation() == generation && !token.is_cancelled() => {
				self.locate = None;
				true
			}
			_ => false,
		}
	}

	pub fn begin_route(&mut self, generation: u64, text: String, origin: Coordinate) -> u64 {
		self.cancel_route();
		self.route = Some(RouteOp {
			token: GenerationToken::new(generation),
			text,
			origin,
			stage: RouteStage::Geocoding,
		});
		generation
	}

	/// Live route operation at `generation` in `stage`, if any.
	pub fn route_at(&mut self, generation: u64, stage: RouteStage) -> Option<&mut RouteOp> {
		self.route
			.as_mut()
			.filter(|op| op.token.generation() == generation && op.stage == stage && !op.token.is_cancelled())
	}

	/// Removes and returns the live route operation at `generation` in `stage`.
	pub fn take_route(&mut self, generation: u64, stage: RouteStage) -> Option<RouteOp> {
		self.route_at(generation, stage)?;
		self.route.take()
	}

	pub fn route(&self) -> Option<&RouteOp> {
		self.route.as_ref()
	}

	/// Cancels the live route operation; returns true if there was one.
	pub fn cancel_route(&mut self) -> bool {
		match self.route.take() {
			Some(op) => {
				op.token.cancel();
				true
			}
			None => false,
		}
	}

	pub fn is_locating(&self) -> bool {
		self.locate.is_some()
	}

	pub fn is_busy(&self) -> bool {
		self.locate.is_some() || self.route.is_some()
	}

	pub fn cancel_all(&mut self) {
		if let Some(token) = self.locate.take() {
			token.cancel();
		}
		self.cancel_route();
	}
}
