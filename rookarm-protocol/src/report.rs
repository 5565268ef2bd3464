//! Status records reported by the robot

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::command::Name;

/// Number of stepper motors on the robot (X, Y1, Y2, Z, gripper)
pub const MAX_AXES: usize = 5;

/// Gantry position in absolute steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// One stepper motor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisReport {
    pub motor: Name,
    pub position: i32,
    pub moving: bool,
    /// `idle`, `moving`, `homing` or `error`
    pub state: Name,
    pub enabled: bool,
    pub homed: bool,
}

/// Latched trigger flags of the three limit switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchReport {
    pub x_triggered: bool,
    pub y_triggered: bool,
    pub z_triggered: bool,
}

/// Full robot snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub position: Position,
    /// Executor running an action, homing, or any axis moving
    pub busy: bool,
    pub homing_state: Name,
    pub is_homing: bool,
    pub axes: Vec<AxisReport, MAX_AXES>,
    pub all_idle: bool,
    pub switches: SwitchReport,
    /// Actions waiting in the queue
    pub queued: u8,
}

/// Reply to a stepper `status` diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperReport {
    pub axes: Vec<AxisReport, MAX_AXES>,
    /// Present when the Y pair was queried: both motors at the same position
    pub y_aligned: Option<bool>,
    /// Present when all motors were queried
    pub all_idle: Option<bool>,
}

/// Reply to a homing `status` diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingReport {
    pub state: Name,
    pub is_homing: bool,
    pub switches: SwitchReport,
}
