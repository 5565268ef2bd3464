//! PWM servo output
//!
//! Runs one PWM slice at a 1 MHz counter clock so compare values are
//! microseconds directly. With `top = 19_999` the frame is 20 ms (50 Hz).

use embassy_rp::pwm::{Config, Pwm};
use fixed::traits::ToFixed;

/// System clock divided down to a 1 µs counter tick
const CLOCK_DIVIDER: u8 = 125;

/// Counter wrap value for a 20 000 µs frame
const FRAME_TOP: u16 = 19_999;

/// Pulse width applied until the first `set_pulse_width_us`
const NEUTRAL_PULSE_US: u16 = 1500;

/// Servo on PWM channel A of one slice
pub struct RpServo<'d> {
    pwm: Pwm<'d>,
    config: Config,
}

impl<'d> RpServo<'d> {
    /// Take over a PWM slice already bound to its channel A pin
    ///
    /// The output starts disabled.
    pub fn new(mut pwm: Pwm<'d>) -> Self {
        let mut config = Self::slice_config();
        config.compare_a = NEUTRAL_PULSE_US;
        pwm.set_config(&config);

        Self { pwm, config }
    }

    /// Default PWM configuration for constructing the slice
    pub fn slice_config() -> Config {
        let mut config = Config::default();
        config.divider = CLOCK_DIVIDER.to_fixed();
        config.top = FRAME_TOP;
        config.enable = false;
        config
    }
}

impl rookarm_hal::ServoPwm for RpServo<'_> {
    fn set_pulse_width_us(&mut self, width_us: u16) {
        self.config.compare_a = width_us.min(FRAME_TOP);
        self.pwm.set_config(&self.config);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.config.enable = enabled;
        self.pwm.set_config(&self.config);
    }
}
