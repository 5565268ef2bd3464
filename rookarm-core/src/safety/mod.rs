//! Limit switch safety
//!
//! Each switch has two independent ways to stop its motors:
//!
//! 1. Interrupt path: an edge is re-sampled and, if still active, raises
//!    an [`EdgeLatch`] that the next controller tick consumes.
//! 2. Poll path: the controller feeds the raw level to
//!    [`LimitSwitch::poll`] every tick, which latches after a short run of
//!    active samples and releases only after a much longer inactive run.
//!
//! Either path reaching `trigger()` emergency-stops the attached motors.

pub mod edge;
pub mod limit_switch;

pub use edge::{EdgeFilter, EdgeLatch};
pub use limit_switch::{LimitSwitch, SwitchEvent, SwitchId, MAX_ATTACHED};
