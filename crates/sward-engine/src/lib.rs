#![forbid(unsafe_code)]

//! The GDD accumulation core: a parameter timeline, a single-day
//! accumulator, the run/reset state machine, and the deterministic
//! full-history recalculation that composes them. Pure and synchronous;
//! loading inputs and persisting the replacement set belong to callers.

pub mod accumulator;
pub mod error;
pub mod recalc;
pub mod runs;
pub mod timeline;

pub use accumulator::daily_gdd;
pub use error::EngineError;
pub use recalc::{recompute, RecalcInput, RecalcOutput};
pub use runs::{validate_manual_reset, RunManager};
pub use timeline::ParameterTimeline;
