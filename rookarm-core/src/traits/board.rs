//! Board type bundle

use embedded_hal::delay::DelayNs;
use rookarm_hal::{OutputPin, ServoPwm};

/// Concrete hardware types of one target
///
/// All STEP/DIR/ENABLE lines share one output type so the motor bank can
/// hold every axis in a single array.
pub trait Board {
    /// Stepper driver output line
    type Pin: OutputPin;
    /// Busy-wait delay for step pulse width
    type Delay: DelayNs;
    /// Servo PWM channel
    type Servo: ServoPwm;
}
