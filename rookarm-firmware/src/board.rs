//! RP2040 board wiring
//!
//! | Function     | STEP | DIR | ENABLE |
//! |--------------|------|-----|--------|
//! | X            | 2    | 3   | 4      |
//! | Y1 (left)    | 5    | 6   | 7      |
//! | Y2 (right)   | 8    | 9   | 10     |
//! | Z            | 11   | 12  | 13     |
//! | Gripper      | 14   | 15  | 16     |
//!
//! Limit switches X/Y/Z on GPIO17/18/19, gripper servo on GPIO20
//! (PWM slice 2, channel A), host UART0 on GPIO0/1.

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;

use rookarm_core::motion::AxisPins;
use rookarm_core::traits::Board;
use rookarm_hal_rp2040::{RpInput, RpOutput, RpServo};

/// Hardware types of this board
pub struct RpBoard;

impl Board for RpBoard {
    type Pin = RpOutput<'static>;
    type Delay = embassy_time::Delay;
    type Servo = RpServo<'static>;
}

/// Claim the three driver lines of one stepper
///
/// STEP and DIR start low; ENABLE starts high so the driver stays
/// released until the controller enables the axis.
pub fn stepper_pins(
    step: Peri<'static, impl Pin>,
    dir: Peri<'static, impl Pin>,
    enable: Peri<'static, impl Pin>,
) -> AxisPins<RpOutput<'static>> {
    AxisPins {
        step: RpOutput::new(Output::new(step, Level::Low)),
        dir: RpOutput::new(Output::new(dir, Level::Low)),
        enable: Some(RpOutput::new(Output::new(enable, Level::High))),
    }
}

/// Limit switch input, pulled toward the inactive level
pub fn limit_input(pin: Peri<'static, impl Pin>, active_high: bool) -> RpInput<'static> {
    let pull = if active_high { Pull::Down } else { Pull::Up };
    RpInput::new(Input::new(pin, pull))
}
