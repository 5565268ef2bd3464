//! Robot controller
//!
//! Owns the machine, the homing sequencer, the action queue and the
//! executor. All motion advances from [`RobotController::update`], which
//! the firmware calls from a fixed-rate motion tick:
//!
//! ```text
//!   update(now) ─► safety (edge latches, then polls) ─► axis ticks ─► homing ─► executor
//!                        │                                  │            │           │
//!                        └──────────────── ControllerEvent list ◄────────┴───────────┘
//! ```
//!
//! Completion is reported through the returned events rather than
//! callbacks.

pub mod homing;
pub mod machine;
mod status;

use core::mem;

use heapless::Vec;
use rookarm_protocol::{HomingReport, StatusReport, StepperReport};

use crate::config::{GripperKind, RobotConfig};
use crate::error::RobotError;
use crate::motion::{AxisId, MotorId, MotorSelector};
use crate::planner::PlannerAction;
use crate::safety::{SwitchEvent, SwitchId};
use crate::scheduler::{ActionExecutor, ActionQueue, ExecutionReport};
use crate::state::HomingState;
use crate::traits::{Board, Manipulator};

pub use homing::HomingSequencer;
pub use machine::{Machine, MachineParts, SwitchSample};

/// Events one update can report
pub const MAX_EVENTS: usize = 24;

pub type Events = Vec<ControllerEvent, MAX_EVENTS>;

/// Something the controller observed or finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerEvent {
    /// Switch latched and its motors were stopped
    LimitTriggered(SwitchId),
    LimitReleased(SwitchId),
    /// Motor reached its bounded target
    MotionComplete(MotorId),
    /// Y1 and Y2 no longer agree; ticking them independently
    PairDiverged,
    PairResynchronized,
    HomingChanged(HomingState),
    /// Homing pass finished and the axis was zeroed
    AxisHomed(AxisId),
    ActionStarted(PlannerAction),
    ActionFinished(ExecutionReport),
}

pub struct RobotController<B: Board> {
    machine: Machine<B>,
    homing: HomingSequencer,
    queue: ActionQueue,
    executor: ActionExecutor,
    pair_diverged: bool,
    /// Events raised by commands between updates
    pending: Events,
}

impl<B: Board> RobotController<B> {
    pub fn new(config: RobotConfig, parts: MachineParts<B>) -> Self {
        Self {
            machine: Machine::new(config, parts),
            homing: HomingSequencer::new(),
            queue: ActionQueue::new(),
            executor: ActionExecutor::new(),
            pair_diverged: false,
            pending: Events::new(),
        }
    }

    pub fn config(&self) -> &RobotConfig {
        self.machine.config()
    }

    pub fn machine(&self) -> &Machine<B> {
        &self.machine
    }

    pub fn homing_state(&self) -> HomingState {
        self.homing.state()
    }

    pub fn is_homing(&self) -> bool {
        self.homing.is_active()
    }

    /// Executor running, homing active, or any motor moving
    pub fn is_busy(&self) -> bool {
        self.executor.is_busy() || self.homing.is_active() || !self.machine.motors().all_idle()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn current_action(&self) -> Option<&PlannerAction> {
        self.executor.current()
    }

    /// Fail with `Busy` while an action or homing owns the gantry
    fn ensure_free(&self) -> Result<(), RobotError> {
        if self.executor.is_busy() || self.homing.is_active() {
            Err(RobotError::Busy)
        } else {
            Ok(())
        }
    }

    // ---- Motion ----

    /// Absolute move of all three axes
    ///
    /// Nothing starts unless every axis is ready and every distance fits
    /// an `i32`.
    pub fn move_to(&mut self, x: i32, y: i32, z: i32, period_us: u32) -> Result<(), RobotError> {
        self.ensure_free()?;
        for axis in AxisId::ALL {
            self.machine.check_axis_ready(axis)?;
        }
        let dx = self.machine.delta_to(AxisId::X, x)?;
        let dy = self.machine.delta_to(AxisId::Y, y)?;
        let dz = self.machine.delta_to(AxisId::Z, z)?;
        self.machine.move_axis(AxisId::X, dx, period_us)?;
        self.machine.move_axis(AxisId::Y, dy, period_us)?;
        self.machine.move_axis(AxisId::Z, dz, period_us)
    }

    /// Relative move of all three axes
    pub fn move_relative(&mut self, dx: i32, dy: i32, dz: i32, period_us: u32) -> Result<(), RobotError> {
        let position = self.machine.position();
        self.move_to(
            position.x.saturating_add(dx),
            position.y.saturating_add(dy),
            position.z.saturating_add(dz),
            period_us,
        )
    }

    pub fn move_xy(&mut self, x: i32, y: i32, period_us: u32) -> Result<(), RobotError> {
        self.ensure_free()?;
        self.machine.move_xy(x, y, period_us)
    }

    pub fn move_z(&mut self, z: i32, period_us: u32) -> Result<(), RobotError> {
        self.ensure_free()?;
        self.machine.move_z(z, period_us)
    }

    /// Emergency-stop every motor
    ///
    /// A running action or homing pass sees its axes stop and fails on
    /// its own.
    pub fn stop_all(&mut self) -> usize {
        self.machine.motors_mut().stop_all()
    }

    /// Bring Y2 back onto Y1's position after a divergence
    pub fn resynchronize_pair(&mut self) -> Result<(), RobotError> {
        self.ensure_free()?;
        let period_us = self.config().speeds.slow_us;
        self.machine.motors_mut().y_pair()?.resynchronize(period_us)
    }

    // ---- Homing ----

    /// Zero every position counter without moving
    ///
    /// For machines without switches wired. Not part of the homing state
    /// machine.
    pub fn home(&mut self) -> Result<(), RobotError> {
        self.ensure_free()?;
        self.zero_fitted()
    }

    fn zero_fitted(&mut self) -> Result<(), RobotError> {
        let fitted: Vec<MotorId, { MotorId::COUNT }> = MotorId::ALL
            .into_iter()
            .filter(|&id| self.machine.motors().is_fitted(id))
            .collect();
        self.machine.zero_motors(&fitted)
    }

    pub fn home_all(&mut self) -> Result<(), RobotError> {
        if self.executor.is_busy() {
            return Err(RobotError::Busy);
        }
        self.homing.home_all(&mut self.machine, &mut self.pending)
    }

    pub fn home_axis(&mut self, axis: AxisId) -> Result<(), RobotError> {
        if self.executor.is_busy() {
            return Err(RobotError::Busy);
        }
        self.homing.home_axis(&mut self.machine, axis, &mut self.pending)
    }

    // ---- Gripper and servos ----

    pub fn gripper_open(&mut self) -> Result<(), RobotError> {
        self.ensure_free()?;
        self.machine.gripper_open()
    }

    pub fn gripper_close(&mut self) -> Result<(), RobotError> {
        self.ensure_free()?;
        self.machine.gripper_close()
    }

    pub fn servo_set_angle(&mut self, id: u8, degrees: u16) -> Result<(), RobotError> {
        self.ensure_servo_free(id)?;
        self.machine.servo_mut(id)?.set_angle(degrees)
    }

    pub fn servo_enable(&mut self, id: u8, enabled: bool) -> Result<(), RobotError> {
        self.ensure_servo_free(id)?;
        self.machine.servo_mut(id)?.enable(enabled);
        Ok(())
    }

    /// The gripper servo belongs to the executor while an action runs
    fn ensure_servo_free(&self, id: u8) -> Result<(), RobotError> {
        match self.machine.config().gripper.kind {
            GripperKind::Servo { servo, .. } if servo == id && self.executor.is_busy() => {
                Err(RobotError::Busy)
            }
            _ => Ok(()),
        }
    }

    // ---- Actions ----

    /// Queue an action for the executor
    pub fn enqueue(&mut self, action: PlannerAction) -> Result<(), RobotError> {
        self.queue.push(action)
    }

    /// Drop every queued action; the running one continues
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // ---- Stepper diagnostics ----

    fn selected(selector: MotorSelector) -> &'static [MotorId] {
        match selector {
            MotorSelector::One(id) => match id {
                MotorId::X => &[MotorId::X],
                MotorId::Y1 => &[MotorId::Y1],
                MotorId::Y2 => &[MotorId::Y2],
                MotorId::Z => &[MotorId::Z],
                MotorId::Gripper => &[MotorId::Gripper],
            },
            MotorSelector::YPair => &[MotorId::Y1, MotorId::Y2],
            MotorSelector::All => &MotorId::ALL,
        }
    }

    /// Relative move of one motor, or the Y pair in lock-step
    pub fn stepper_move(&mut self, selector: MotorSelector, steps: i32, period_us: u32) -> Result<(), RobotError> {
        self.ensure_free()?;
        let motors = self.machine.motors_mut();
        match selector {
            MotorSelector::One(id) => motors.get_mut(id)?.move_steps(steps, period_us),
            MotorSelector::YPair => motors.y_pair()?.move_steps_sync(steps, period_us),
            MotorSelector::All => Err(RobotError::InvalidArgument),
        }
    }

    /// Stop the selected motors; returns how many were moving
    pub fn stepper_stop(&mut self, selector: MotorSelector) -> usize {
        let motors = self.machine.motors_mut();
        let mut stopped = 0;
        for &id in Self::selected(selector) {
            if let Ok(motor) = motors.get_mut(id) {
                stopped += usize::from(motor.emergency_stop());
            }
        }
        stopped
    }

    pub fn stepper_enable(&mut self, selector: MotorSelector, enabled: bool) -> Result<(), RobotError> {
        let motors = self.machine.motors_mut();
        match selector {
            MotorSelector::All => motors.enable_all(enabled),
            _ => {
                for &id in Self::selected(selector) {
                    motors.get_mut(id)?.enable(enabled);
                }
            }
        }
        Ok(())
    }

    /// Zero the selected position counters without motion
    pub fn stepper_zero(&mut self, selector: MotorSelector) -> Result<(), RobotError> {
        self.ensure_free()?;
        match selector {
            MotorSelector::All => self.zero_fitted(),
            _ => self.machine.zero_motors(Self::selected(selector)),
        }
    }

    // ---- Reports ----

    pub fn status(&self) -> StatusReport {
        status::status_report(self)
    }

    pub fn stepper_report(&self, selector: Option<MotorSelector>) -> Result<StepperReport, RobotError> {
        status::stepper_report(&self.machine, selector.unwrap_or(MotorSelector::All))
    }

    pub fn homing_report(&self) -> HomingReport {
        status::homing_report(&self.machine, self.homing.state(), self.homing.is_active())
    }

    // ---- Update ----

    /// Run one motion tick
    ///
    /// `switches` holds one sample per [`SwitchId::index`].
    pub fn update(&mut self, now_us: u64, switches: &[SwitchSample; 3]) -> Events {
        let mut events = mem::take(&mut self.pending);

        for id in SwitchId::ALL {
            match self.machine.service_switch(id, switches[id.index()]) {
                Some(SwitchEvent::Triggered) => {
                    let _ = events.push(ControllerEvent::LimitTriggered(id));
                }
                Some(SwitchEvent::Released) => {
                    let _ = events.push(ControllerEvent::LimitReleased(id));
                }
                None => {}
            }
        }

        let tick = self.machine.tick(now_us);
        for id in tick.completed {
            let _ = events.push(ControllerEvent::MotionComplete(id));
        }
        if let Some(diverged) = tick.pair_diverged {
            if diverged != self.pair_diverged {
                self.pair_diverged = diverged;
                let event = if diverged {
                    ControllerEvent::PairDiverged
                } else {
                    ControllerEvent::PairResynchronized
                };
                let _ = events.push(event);
            }
        }

        self.homing.update(&mut self.machine, &mut events);

        self.run_executor(now_us, &mut events);
        events
    }

    fn run_executor(&mut self, now_us: u64, events: &mut Events) {
        if !self.executor.is_busy() {
            if self.homing.is_active() || !self.machine.motors().all_idle() {
                return;
            }
            let Some(action) = self.queue.pop() else {
                return;
            };
            // Executor is idle here, so start cannot fail
            if self.executor.start(action, self.machine.config()).is_err() {
                return;
            }
            let _ = events.push(ControllerEvent::ActionStarted(action));
        }

        let config = *self.machine.config();
        if let Some(report) = self.executor.poll(&mut self.machine, &config, now_us) {
            let _ = events.push(ControllerEvent::ActionFinished(report));
        }
    }
}
