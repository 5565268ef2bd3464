//! Executor-facing view of the machine

use crate::error::RobotError;

/// Progress of a commanded motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// Still travelling
    Pending,
    /// Target reached and all involved axes idle
    Reached,
    /// Axes stopped short of the target, or faulted
    Failed,
}

/// Motion commands used by pickup/place primitives
///
/// Commands start motion and return immediately. The executor polls the
/// `*_progress` methods until they report `Reached`.
pub trait Manipulator {
    /// Start an absolute move of X and the Y pair together
    fn move_xy(&mut self, x: i32, y: i32, period_us: u32) -> Result<(), RobotError>;

    /// Start an absolute Z move
    fn move_z(&mut self, z: i32, period_us: u32) -> Result<(), RobotError>;

    fn xy_progress(&self, x: i32, y: i32) -> Progress;

    fn z_progress(&self, z: i32) -> Progress;

    fn gripper_open(&mut self) -> Result<(), RobotError>;

    fn gripper_close(&mut self) -> Result<(), RobotError>;

    /// Whether the gripper actuator has finished its last command
    fn gripper_progress(&self) -> Progress;
}
