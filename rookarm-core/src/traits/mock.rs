//! Host-side hardware mocks for unit tests

use embedded_hal::delay::DelayNs;
use rookarm_hal::{OutputPin, ServoPwm};

use super::Board;

/// Output pin that counts rising edges
#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
    rising_edges: u32,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising_edges
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Delay that returns immediately
pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Servo that records the last pulse width
#[derive(Debug, Default)]
pub struct MockServo {
    pub width_us: u16,
    pub enabled: bool,
}

impl ServoPwm for MockServo {
    fn set_pulse_width_us(&mut self, width_us: u16) {
        self.width_us = width_us;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

pub struct MockBoard;

impl Board for MockBoard {
    type Pin = MockPin;
    type Delay = NoopDelay;
    type Servo = MockServo;
}
