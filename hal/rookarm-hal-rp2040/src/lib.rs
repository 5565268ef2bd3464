//! RP2040-specific HAL for the chess robot firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `rookarm-hal` traits:
//!
//! - GPIO outputs for STEP/DIR/ENABLE lines
//! - GPIO inputs for limit switches (with async edge waiting)
//! - PWM servo output on a single slice channel

#![no_std]

pub mod gpio;
pub mod servo;

pub use gpio::{RpInput, RpOutput};
pub use servo::RpServo;

// Re-export shared traits from rookarm-hal for convenience
pub use rookarm_hal::{InputPin, OutputPin, ServoPwm};
