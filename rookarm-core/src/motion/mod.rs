//! Stepper motion
//!
//! - [`Axis`]: one stepper motor, non-blocking, advanced by `tick()`
//! - [`AxisPair`]: two motors driven as one logical axis (dual Y)
//! - [`MotorBank`]: the fixed set of motors, addressed by [`MotorId`]

pub mod axis;
pub mod bank;
pub mod ids;
pub mod pair;

pub use axis::{Axis, AxisPins, AxisState, Direction, TickOutcome, STEP_PULSE_NS};
pub use bank::{BankTick, MotorBank};
pub use ids::{AxisId, MotorId, MotorSelector};
pub use pair::{AxisPair, PairTick};
