//! Error taxonomy shared by every layer of the core

use core::fmt;

use rookarm_protocol::ErrorCode;

/// Errors returned by axis, controller and planner operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RobotError {
    /// Operation attempted on a disabled axis
    Disabled,
    /// Axis or controller already executing
    Busy,
    /// Malformed square, unknown axis/motor name, out-of-range angle
    InvalidArgument,
    /// Motor, servo or limit switch not fitted
    DeviceUnavailable,
    /// A motion step of an action failed
    MotorError,
    /// A wait exceeded its bound
    Timeout,
    /// Action queue full; the action was not queued
    QueueFull,
}

impl fmt::Display for RobotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RobotError::Disabled => "axis disabled",
            RobotError::Busy => "busy",
            RobotError::InvalidArgument => "invalid argument",
            RobotError::DeviceUnavailable => "device unavailable",
            RobotError::MotorError => "motor error",
            RobotError::Timeout => "timeout",
            RobotError::QueueFull => "action queue full",
        };
        f.write_str(text)
    }
}

impl From<RobotError> for ErrorCode {
    fn from(err: RobotError) -> Self {
        match err {
            RobotError::Disabled => ErrorCode::Disabled,
            RobotError::Busy => ErrorCode::Busy,
            RobotError::InvalidArgument => ErrorCode::InvalidArgument,
            RobotError::DeviceUnavailable => ErrorCode::DeviceUnavailable,
            RobotError::MotorError => ErrorCode::MotorError,
            RobotError::Timeout => ErrorCode::Timeout,
            RobotError::QueueFull => ErrorCode::QueueFull,
        }
    }
}
