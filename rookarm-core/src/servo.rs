//! Hobby servo driver
//!
//! Maps an angle in degrees onto a 50 Hz pulse train:
//! 0° is 500 µs, 180° is 2500 µs, linear in between.
//!
//! # Usage
//!
//! ```ignore
//! let mut servo = Servo::new(pwm);
//! servo.set_angle(90)?;
//! servo.enable(true);
//! ```

use rookarm_hal::ServoPwm;

use crate::config::MAX_SERVO_ANGLE;
use crate::error::RobotError;

/// Pulse width at 0°
pub const SERVO_MIN_PULSE_US: u16 = 500;
/// Pulse width at 180°
pub const SERVO_MAX_PULSE_US: u16 = 2500;
/// Frame period (50 Hz)
pub const SERVO_PERIOD_US: u16 = 20_000;
/// Number of servo slots on the machine
pub const MAX_SERVOS: usize = 1;

/// Pulse width for an angle, clamped to the servo range
pub fn angle_to_pulse_us(degrees: u16) -> u16 {
    let degrees = degrees.min(MAX_SERVO_ANGLE) as u32;
    let span = (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) as u32;
    SERVO_MIN_PULSE_US + (degrees * span / MAX_SERVO_ANGLE as u32) as u16
}

pub struct Servo<S: ServoPwm> {
    pwm: S,
    angle: u16,
    enabled: bool,
}

impl<S: ServoPwm> Servo<S> {
    /// Create a disabled servo parked at 90°
    pub fn new(mut pwm: S) -> Self {
        let angle = MAX_SERVO_ANGLE / 2;
        pwm.set_enabled(false);
        pwm.set_pulse_width_us(angle_to_pulse_us(angle));
        Self {
            pwm,
            angle,
            enabled: false,
        }
    }

    /// Command a new angle
    ///
    /// Angles above 180° are rejected and leave the output unchanged.
    pub fn set_angle(&mut self, degrees: u16) -> Result<(), RobotError> {
        if degrees > MAX_SERVO_ANGLE {
            return Err(RobotError::InvalidArgument);
        }
        self.angle = degrees;
        self.pwm.set_pulse_width_us(angle_to_pulse_us(degrees));
        Ok(())
    }

    pub fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.pwm.set_enabled(enabled);
    }

    pub fn angle(&self) -> u16 {
        self.angle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(test)]
    pub(crate) fn pwm(&self) -> &S {
        &self.pwm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::MockServo;

    #[test]
    fn test_angle_to_pulse_endpoints() {
        assert_eq!(angle_to_pulse_us(0), 500);
        assert_eq!(angle_to_pulse_us(90), 1500);
        assert_eq!(angle_to_pulse_us(180), 2500);
        assert_eq!(angle_to_pulse_us(400), 2500);
    }

    #[test]
    fn test_set_angle_drives_pwm() {
        let mut servo = Servo::new(MockServo::default());
        servo.set_angle(45).unwrap();
        servo.enable(true);

        assert_eq!(servo.angle(), 45);
        assert_eq!(servo.pwm().width_us, 1000);
        assert!(servo.pwm().enabled);
    }

    #[test]
    fn test_out_of_range_angle_rejected() {
        let mut servo = Servo::new(MockServo::default());
        servo.set_angle(30).unwrap();

        assert_eq!(servo.set_angle(181), Err(RobotError::InvalidArgument));
        assert_eq!(servo.angle(), 30);
        assert_eq!(servo.pwm().width_us, angle_to_pulse_us(30));
    }
}
