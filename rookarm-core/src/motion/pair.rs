//! Dual-motor axis coordination
//!
//! The Y gantry is carried by two motors that must stay at the same step
//! count. While both agree on position, target, period and schedule the
//! pair pulses them together from one timing decision. Once they disagree
//! (one stalled or was stopped on its own) each motor is ticked on its own
//! and the tick reports the divergence so the caller can resynchronize.

use embedded_hal::delay::DelayNs;
use rookarm_hal::OutputPin;

use super::axis::{Axis, AxisState, Direction, TickOutcome, STEP_PULSE_NS};
use crate::error::RobotError;

/// Result of one pair tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PairTick {
    /// Both motors advanced in lock-step
    Locked(TickOutcome),
    /// Motors ticked separately
    Independent {
        first: TickOutcome,
        second: TickOutcome,
        /// Position or target no longer agree
        diverged: bool,
    },
}

impl PairTick {
    pub fn diverged(&self) -> bool {
        matches!(self, PairTick::Independent { diverged: true, .. })
    }
}

/// Borrowed view of two axes driven as one
pub struct AxisPair<'a, P: OutputPin> {
    first: &'a mut Axis<P>,
    second: &'a mut Axis<P>,
}

impl<'a, P: OutputPin> AxisPair<'a, P> {
    pub fn new(first: &'a mut Axis<P>, second: &'a mut Axis<P>) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &Axis<P> {
        self.first
    }

    pub fn second(&self) -> &Axis<P> {
        self.second
    }

    /// Start the same relative move on both motors
    ///
    /// Neither starts unless both are enabled and idle.
    pub fn move_steps_sync(&mut self, delta: i32, period_us: u32) -> Result<(), RobotError> {
        self.first.check_ready()?;
        self.second.check_ready()?;
        self.first.move_steps(delta, period_us)?;
        self.second.move_steps(delta, period_us)?;
        self.second.align_schedule(self.first.next_step_due_us());
        Ok(())
    }

    /// Start homing on both motors
    pub fn start_homing_sync(
        &mut self,
        direction: Direction,
        period_us: u32,
    ) -> Result<(), RobotError> {
        self.first.check_ready()?;
        self.second.check_ready()?;
        self.first.start_homing(direction, period_us)?;
        self.second.start_homing(direction, period_us)?;
        self.second.align_schedule(self.first.next_step_due_us());
        Ok(())
    }

    /// Stop both motors; returns `true` if either was moving
    pub fn emergency_stop(&mut self) -> bool {
        let first = self.first.emergency_stop();
        let second = self.second.emergency_stop();
        first || second
    }

    /// Both motors at the same step count with the same target
    pub fn is_aligned(&self) -> bool {
        self.first.position() == self.second.position()
            && self.first.target() == self.second.target()
    }

    pub fn is_idle(&self) -> bool {
        self.first.is_idle() && self.second.is_idle()
    }

    pub fn is_homing(&self) -> bool {
        self.first.is_homing() || self.second.is_homing()
    }

    /// Whether the next tick can drive both motors from one schedule
    fn lock_step(&self) -> bool {
        let (a, b) = (&*self.first, &*self.second);
        a.is_active()
            && a.state() == b.state()
            && a.position() == b.position()
            && a.target() == b.target()
            && a.direction() == b.direction()
            && a.step_period_us() == b.step_period_us()
            && a.next_step_due_us() == b.next_step_due_us()
    }

    /// Advance both motors to `now_us`
    pub fn tick<D: DelayNs>(&mut self, now_us: u64, delay: &mut D) -> PairTick {
        if !self.lock_step() {
            let first = self.first.tick(now_us, delay);
            let second = self.second.tick(now_us, delay);
            return PairTick::Independent {
                first,
                second,
                diverged: !self.is_aligned() || self.first.state() != self.second.state(),
            };
        }

        // Identical state means identical bookkeeping outcome
        let outcome = self.first.begin_tick(now_us);
        let _ = self.second.begin_tick(now_us);
        if let Some(outcome) = outcome {
            return PairTick::Locked(outcome);
        }

        self.first.step_pin().set_high();
        self.second.step_pin().set_high();
        delay.delay_ns(STEP_PULSE_NS);
        self.first.step_pin().set_low();
        self.second.step_pin().set_low();
        self.first.advance();
        self.second.advance();
        PairTick::Locked(TickOutcome::Stepped)
    }

    /// Move the second motor onto the first motor's position
    ///
    /// Both must be idle. A no-op when already aligned.
    pub fn resynchronize(&mut self, period_us: u32) -> Result<(), RobotError> {
        if !self.is_idle() {
            return Err(RobotError::Busy);
        }
        let delta = self.first.position() - self.second.position();
        self.second.move_steps(delta, period_us)
    }

    pub fn state(&self) -> AxisState {
        if self.first.state() == AxisState::Error || self.second.state() == AxisState::Error {
            AxisState::Error
        } else if self.is_homing() {
            AxisState::Homing
        } else if self.first.is_active() || self.second.is_active() {
            AxisState::Moving
        } else {
            AxisState::Idle
        }
    }
}
