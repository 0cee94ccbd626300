//! Signal timing: period and phase of square-wave zero-cross signals.

pub mod edge;
pub mod period;
pub mod phase;

pub use edge::wait_for_cycle;
pub use period::{measure_period, PeriodSample};
pub use phase::{measure_phase, normalize_phase, raw_angle, PhaseSample};
