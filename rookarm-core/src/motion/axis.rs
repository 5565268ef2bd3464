//! Single stepper axis driver
//!
//! The driver never blocks: `move_steps` and `start_homing` only arm the
//! axis, and `tick` emits at most one step pulse per call when the step
//! period has elapsed. Completion is reported through [`TickOutcome`].

use embedded_hal::delay::DelayNs;
use rookarm_hal::OutputPin;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RobotError;

/// Minimum STEP high time in nanoseconds
pub const STEP_PULSE_NS: u32 = 5_000;

/// Logical travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Increasing position
    Forward,
    /// Decreasing position
    Reverse,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Direction of travel for a signed step delta
    pub fn of_delta(delta: i32) -> Self {
        if delta < 0 {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Position change per step
    pub const fn step(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Axis activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisState {
    Idle,
    /// Travelling to a bounded target
    Moving,
    /// Travelling toward a switch until stopped
    Homing,
    /// Faulted; cleared by re-enabling or `set_position`
    Error,
}

impl AxisState {
    pub const fn name(self) -> &'static str {
        match self {
            AxisState::Idle => "idle",
            AxisState::Moving => "moving",
            AxisState::Homing => "homing",
            AxisState::Error => "error",
        }
    }
}

/// Result of one `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Axis not moving
    Inactive,
    /// Moving, next step not yet due
    Waiting,
    /// One pulse emitted
    Stepped,
    /// Target reached this tick; axis is now idle
    Completed,
}

/// STEP/DIR/ENABLE lines of one driver
///
/// ENABLE is active-low. Drivers with ENABLE tied off pass `None`.
pub struct AxisPins<P> {
    pub step: P,
    pub dir: P,
    pub enable: Option<P>,
}

/// One stepper motor
pub struct Axis<P: OutputPin> {
    pins: AxisPins<P>,
    position: i32,
    target: i32,
    step_period_us: u32,
    next_step_due_us: u64,
    /// Timestamp of the most recent tick
    clock_us: u64,
    state: AxisState,
    direction: Direction,
    direction_inverted: bool,
    enabled: bool,
    homed: bool,
}

impl<P: OutputPin> Axis<P> {
    /// Create a disabled axis at position 0
    pub fn new(mut pins: AxisPins<P>, direction_inverted: bool) -> Self {
        pins.step.set_low();
        if let Some(enable) = pins.enable.as_mut() {
            enable.set_high();
        }
        Self {
            pins,
            position: 0,
            target: 0,
            step_period_us: 0,
            next_step_due_us: 0,
            clock_us: 0,
            state: AxisState::Idle,
            direction: Direction::Forward,
            direction_inverted,
            enabled: false,
            homed: false,
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn state(&self) -> AxisState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn step_period_us(&self) -> u32 {
        self.step_period_us
    }

    pub fn next_step_due_us(&self) -> u64 {
        self.next_step_due_us
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Moving or homing
    pub fn is_active(&self) -> bool {
        matches!(self.state, AxisState::Moving | AxisState::Homing)
    }

    pub fn is_homing(&self) -> bool {
        self.state == AxisState::Homing
    }

    pub fn is_idle(&self) -> bool {
        self.state == AxisState::Idle
    }

    /// Position was established by a homing pass
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    pub fn pins(&self) -> &AxisPins<P> {
        &self.pins
    }

    /// Power the driver on or off
    ///
    /// Disabling halts any motion and clears a fault.
    pub fn enable(&mut self, enabled: bool) {
        if let Some(pin) = self.pins.enable.as_mut() {
            pin.set_state(!enabled);
        }
        self.enabled = enabled;
        if !enabled || self.state == AxisState::Error {
            self.target = self.position;
            self.state = AxisState::Idle;
        }
    }

    /// Start a relative move of `delta` steps
    ///
    /// A zero delta succeeds without starting motion.
    pub fn move_steps(&mut self, delta: i32, period_us: u32) -> Result<(), RobotError> {
        self.check_ready()?;
        if delta != 0 {
            self.arm(Direction::of_delta(delta), period_us);
            self.target = self.position.saturating_add(delta);
            self.state = AxisState::Moving;
        }
        Ok(())
    }

    /// Start travelling toward a switch with no bounded target
    pub fn start_homing(&mut self, direction: Direction, period_us: u32) -> Result<(), RobotError> {
        self.check_ready()?;
        self.arm(direction, period_us);
        self.target = self.position;
        self.state = AxisState::Homing;
        Ok(())
    }

    /// Halt immediately without further pulses
    ///
    /// Returns `true` if motion was in progress.
    pub fn emergency_stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.target = self.position;
        self.state = AxisState::Idle;
        true
    }

    /// Halt and latch a fault
    pub fn fault(&mut self) {
        self.target = self.position;
        self.state = AxisState::Error;
    }

    /// Overwrite the position counter
    ///
    /// Clears a fault. Fails with `Busy` while the axis is moving.
    pub fn set_position(&mut self, position: i32) -> Result<(), RobotError> {
        if self.is_active() {
            return Err(RobotError::Busy);
        }
        self.position = position;
        self.target = position;
        self.state = AxisState::Idle;
        Ok(())
    }

    pub fn set_homed(&mut self, homed: bool) {
        self.homed = homed;
    }

    /// Advance the axis to `now_us`, emitting at most one pulse
    pub fn tick<D: DelayNs>(&mut self, now_us: u64, delay: &mut D) -> TickOutcome {
        match self.begin_tick(now_us) {
            Some(outcome) => outcome,
            None => {
                self.pins.step.set_high();
                delay.delay_ns(STEP_PULSE_NS);
                self.pins.step.set_low();
                self.advance();
                TickOutcome::Stepped
            }
        }
    }

    /// Bookkeeping before a pulse; `None` means a pulse is due now
    pub(super) fn begin_tick(&mut self, now_us: u64) -> Option<TickOutcome> {
        self.clock_us = now_us;
        match self.state {
            AxisState::Moving if self.position == self.target => {
                self.state = AxisState::Idle;
                Some(TickOutcome::Completed)
            }
            AxisState::Moving | AxisState::Homing => {
                (now_us < self.next_step_due_us).then_some(TickOutcome::Waiting)
            }
            AxisState::Idle | AxisState::Error => Some(TickOutcome::Inactive),
        }
    }

    pub(super) fn step_pin(&mut self) -> &mut P {
        &mut self.pins.step
    }

    /// Account for one emitted pulse
    pub(super) fn advance(&mut self) {
        self.position = self.position.saturating_add(self.direction.step());
        if self.state == AxisState::Homing {
            self.target = self.position;
        }
        self.next_step_due_us = self.next_step_due_us.saturating_add(self.step_period_us as u64);
    }

    /// Fails unless the axis is enabled and idle
    pub fn check_ready(&self) -> Result<(), RobotError> {
        if !self.enabled {
            return Err(RobotError::Disabled);
        }
        match self.state {
            AxisState::Idle => Ok(()),
            AxisState::Error => Err(RobotError::MotorError),
            AxisState::Moving | AxisState::Homing => Err(RobotError::Busy),
        }
    }

    /// Latch direction and schedule the first pulse at the next tick
    fn arm(&mut self, direction: Direction, period_us: u32) {
        self.direction = direction;
        let forward = direction == Direction::Forward;
        self.pins.dir.set_state(forward != self.direction_inverted);
        self.step_period_us = period_us;
        self.next_step_due_us = self.clock_us;
    }

    pub(super) fn align_schedule(&mut self, next_step_due_us: u64) {
        self.next_step_due_us = next_step_due_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::{MockPin, NoopDelay};

    fn axis() -> Axis<MockPin> {
        let mut axis = Axis::new(
            AxisPins {
                step: MockPin::new(),
                dir: MockPin::new(),
                enable: Some(MockPin::new()),
            },
            false,
        );
        axis.enable(true);
        axis
    }

    /// Tick until idle, returning the tick count
    fn run(axis: &mut Axis<MockPin>, start_us: u64, period_us: u64) -> u64 {
        let mut now = start_us;
        let mut ticks = 0;
        while axis.is_active() {
            axis.tick(now, &mut NoopDelay);
            now += period_us;
            ticks += 1;
            assert!(ticks < 100_000);
        }
        ticks
    }

    #[test]
    fn test_new_axis_is_disabled_and_idle() {
        let axis = Axis::new(
            AxisPins {
                step: MockPin::new(),
                dir: MockPin::new(),
                enable: Some(MockPin::new()),
            },
            false,
        );
        assert!(!axis.is_enabled());
        assert_eq!(axis.state(), AxisState::Idle);
        // Active-low enable: high means off
        assert!(axis.pins().enable.as_ref().unwrap().is_set_high());
    }

    #[test]
    fn test_move_rejected_when_disabled() {
        let mut axis = axis();
        axis.enable(false);
        assert_eq!(axis.move_steps(10, 100), Err(RobotError::Disabled));
        assert_eq!(axis.start_homing(Direction::Reverse, 100), Err(RobotError::Disabled));
        assert_eq!(axis.state(), AxisState::Idle);
    }

    #[test]
    fn test_move_rejected_when_busy() {
        let mut axis = axis();
        axis.move_steps(10, 100).unwrap();
        assert_eq!(axis.move_steps(5, 100), Err(RobotError::Busy));
        assert_eq!(axis.target(), 10);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut axis = axis();
        axis.move_steps(0, 100).unwrap();
        assert!(axis.is_idle());
    }

    #[test]
    fn test_move_reaches_target() {
        let mut axis = axis();
        axis.move_steps(25, 100).unwrap();
        assert_eq!(axis.state(), AxisState::Moving);
        run(&mut axis, 0, 100);
        assert_eq!(axis.position(), 25);
        assert_eq!(axis.target(), 25);
        assert_eq!(axis.pins().step.rising_edges(), 25);
    }

    #[test]
    fn test_reverse_move_sets_dir_low() {
        let mut axis = axis();
        axis.move_steps(-3, 100).unwrap();
        assert!(axis.pins().dir.is_set_low());
        run(&mut axis, 0, 100);
        assert_eq!(axis.position(), -3);
    }

    #[test]
    fn test_inverted_direction_flips_dir_pin_only() {
        let mut axis = Axis::new(
            AxisPins {
                step: MockPin::new(),
                dir: MockPin::new(),
                enable: None,
            },
            true,
        );
        axis.enable(true);
        axis.move_steps(2, 100).unwrap();
        assert!(axis.pins().dir.is_set_low());
        run(&mut axis, 0, 100);
        assert_eq!(axis.position(), 2);
    }

    #[test]
    fn test_step_waits_for_period() {
        let mut axis = axis();
        axis.move_steps(2, 1000).unwrap();
        assert_eq!(axis.tick(0, &mut NoopDelay), TickOutcome::Stepped);
        assert_eq!(axis.tick(500, &mut NoopDelay), TickOutcome::Waiting);
        assert_eq!(axis.tick(1000, &mut NoopDelay), TickOutcome::Stepped);
        assert_eq!(axis.tick(1100, &mut NoopDelay), TickOutcome::Completed);
        assert_eq!(axis.tick(1200, &mut NoopDelay), TickOutcome::Inactive);
    }

    #[test]
    fn test_homing_runs_until_stopped() {
        let mut axis = axis();
        axis.start_homing(Direction::Reverse, 10).unwrap();
        for i in 0..50 {
            axis.tick(i * 10, &mut NoopDelay);
        }
        assert!(axis.is_homing());
        assert_eq!(axis.position(), -50);
        assert!(axis.emergency_stop());
        assert!(axis.is_idle());
        assert_eq!(axis.target(), -50);
    }

    #[test]
    fn test_emergency_stop_halts_pulses() {
        let mut axis = axis();
        axis.move_steps(100, 10).unwrap();
        for i in 0..10 {
            axis.tick(i * 10, &mut NoopDelay);
        }
        assert!(axis.emergency_stop());
        let pulses = axis.pins().step.rising_edges();
        for i in 10..20 {
            assert_eq!(axis.tick(i * 10, &mut NoopDelay), TickOutcome::Inactive);
        }
        assert_eq!(axis.pins().step.rising_edges(), pulses);
        assert_eq!(axis.position(), axis.target());
    }

    #[test]
    fn test_emergency_stop_idempotent_on_idle() {
        let mut axis = axis();
        axis.move_steps(3, 10).unwrap();
        run(&mut axis, 0, 10);
        let before = (axis.position(), axis.target(), axis.state());

        assert!(!axis.emergency_stop());
        assert!(!axis.emergency_stop());
        assert_eq!((axis.position(), axis.target(), axis.state()), before);
    }

    #[test]
    fn test_disable_forces_idle() {
        let mut axis = axis();
        axis.move_steps(100, 10).unwrap();
        axis.tick(0, &mut NoopDelay);
        axis.enable(false);
        assert!(axis.is_idle());
        assert_eq!(axis.position(), axis.target());
        assert_eq!(axis.tick(10, &mut NoopDelay), TickOutcome::Inactive);
        assert!(axis.pins().enable.as_ref().unwrap().is_set_high());
    }

    #[test]
    fn test_set_position_rejected_while_moving() {
        let mut axis = axis();
        axis.move_steps(5, 10).unwrap();
        assert_eq!(axis.set_position(0), Err(RobotError::Busy));
        axis.emergency_stop();
        axis.set_position(1234).unwrap();
        assert_eq!(axis.position(), 1234);
        assert_eq!(axis.target(), 1234);
    }

    #[test]
    fn test_fault_blocks_moves_until_cleared() {
        let mut axis = axis();
        axis.fault();
        assert_eq!(axis.move_steps(1, 10), Err(RobotError::MotorError));
        axis.set_position(0).unwrap();
        assert!(axis.move_steps(1, 10).is_ok());
    }

    #[test]
    fn test_move_armed_at_last_tick_time() {
        let mut axis = axis();
        axis.tick(5_000, &mut NoopDelay);
        axis.move_steps(1, 100).unwrap();
        assert_eq!(axis.next_step_due_us(), 5_000);
    }
}
