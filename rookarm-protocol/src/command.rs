//! Host → robot commands

use heapless::String;
use serde::{Deserialize, Serialize};

/// Motor, axis or selector name (`"x"`, `"y2"`, `"gripper"`, `"all"`)
pub type Name = String<8>;

/// Chess square in algebraic notation (`"e4"`)
pub type SquareText = String<4>;

/// Commands accepted by the robot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Absolute move of the gantry, in steps
    MoveTo {
        x: i32,
        y: i32,
        z: i32,
        /// Step period in microseconds
        speed_us: u32,
    },
    /// Zero all position counters without moving (no switches needed)
    Home,
    /// Run the full Z → Y → X homing sequence
    HomeAll,
    /// Home a single axis (`"x"`, `"y"` or `"z"`)
    HomeAxis { axis: Name },
    GripperOpen,
    GripperClose,
    ServoSetAngle { id: u8, degrees: u16 },
    ServoEnable { id: u8, enable: bool },
    /// Queue a chess action for the executor
    Execute(ActionRequest),
    /// Stepper diagnostics
    Stepper(StepperCommand),
    /// Homing diagnostics
    Homing(HomingCommand),
    /// Full status snapshot
    Status,
}

/// Chess action with squares in text form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionRequest {
    Move {
        from: SquareText,
        to: SquareText,
    },
    Capture {
        from: SquareText,
        to: SquareText,
    },
    EnPassant {
        from: SquareText,
        to: SquareText,
        captured: SquareText,
    },
    Castle {
        rook_from: SquareText,
        rook_to: SquareText,
        king_from: SquareText,
        king_to: SquareText,
    },
    Remove {
        from: SquareText,
    },
}

/// Direct stepper diagnostics
///
/// `target` accepts a motor name, `"y"` for the Y pair, or `"all"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperCommand {
    /// Relative move; `speed_us` defaults to the configured default speed
    Move {
        motor: Name,
        steps: i32,
        speed_us: Option<u32>,
    },
    Stop { target: Name },
    /// Status of one motor, the Y pair, or everything when `None`
    Status { motor: Option<Name> },
    Enable { target: Name, enable: bool },
    /// Zero position counters only; no physical homing
    Home { target: Name },
}

/// Homing diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingCommand {
    /// Start homing of one axis, or the full sequence for `"all"`
    Start { axis: Name },
    Status,
}
