//! Homing state machine
//!
//! Sequences the axes Z → Y → X so the gripper is raised before the
//! gantry moves. The machine is explicit, finite and deterministic; the
//! controller feeds it events from its update tick.

pub mod homing;

pub use homing::{HomingEvent, HomingState};
