//! PWM output for hobby servos

/// Servo pulse output
///
/// Implementations run a fixed 50 Hz frame (20 ms period) and expose the
/// high time of each frame. Angle math lives in the core crate.
pub trait ServoPwm {
    /// Set the high time of each frame in microseconds
    fn set_pulse_width_us(&mut self, width_us: u16);

    /// Start or stop emitting pulses
    fn set_enabled(&mut self, enabled: bool);
}
