//! Time-sliced animation: easing curves and a cooperative, keyed frame
//! scheduler driven by an external tick source.

pub mod easing;
pub mod scheduler;

pub use easing::{ease, interpolate};
pub use scheduler::{Frame, FrameSample, Scheduler, Tick, TimerId};
