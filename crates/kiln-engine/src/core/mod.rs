//! Outer loop.
//!
//! The scheduler owns no resources of its own: the clock, event source,
//! script and display are lent to each step, which keeps it testable
//! without a window or an interpreter.

mod scheduler;

pub use scheduler::{FrameScheduler, RunStats, SchedulerState};
