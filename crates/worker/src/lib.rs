//! Worker primitives: task spawning, generation tokens, cancellable timers
//! and keyed request coalescing.

mod class;
pub mod coalesce;
mod spawn;
mod timer;
mod token;

pub use class::TaskClass;
pub use coalesce::{CoalescePolicy, Coalescer, SubmitOutcome};
pub use spawn::spawn;
pub use timer::TimerHandle;
pub use token::{GenerationClock, GenerationToken, LatestGeneration};
