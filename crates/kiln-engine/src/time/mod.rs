//! Time subsystem.
//!
//! Provides the monotonic time source and the fixed-timestep accumulator used
//! by the frame scheduler. Neither is coupled to the windowing layer, so both
//! can be driven by scripted timestamps in tests.

mod frame_clock;
mod timestep;

pub use frame_clock::{Clock, MonotonicClock};
pub use timestep::FixedTimestep;
