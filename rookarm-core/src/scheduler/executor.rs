//! Non-blocking action executor
//!
//! Runs one [`PlannerAction`] as a sequence of pickup/place primitives.
//! Each call to [`ActionExecutor::poll`] issues command steps until it
//! reaches a wait step whose condition is not yet met, then returns so the
//! caller can keep ticking the axes. Waits are bounded by the configured
//! wait timeout.
//!
//! The first failing step aborts the rest of the action. Nothing is rolled
//! back: a piece may be left in the gripper.

use heapless::Vec;

use crate::config::RobotConfig;
use crate::error::RobotError;
use crate::planner::{MotionStep, PlannerAction, Primitive, MAX_PRIMITIVES, MAX_STEPS};
use crate::traits::{Manipulator, Progress};

/// Outcome of one finished action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExecutionReport {
    pub action: PlannerAction,
    pub result: Result<(), RobotError>,
    /// Primitives that ran to completion
    pub primitives_completed: u8,
}

enum StepOutcome {
    Done,
    Pending,
}

struct Run {
    action: PlannerAction,
    primitives: Vec<Primitive, MAX_PRIMITIVES>,
    primitive_index: usize,
    steps: Vec<MotionStep, MAX_STEPS>,
    step_index: usize,
    /// Start of the wait step in progress
    wait_started_us: Option<u64>,
}

impl Run {
    fn report(&self, result: Result<(), RobotError>) -> ExecutionReport {
        ExecutionReport {
            action: self.action,
            result,
            primitives_completed: self.primitive_index as u8,
        }
    }
}

/// Executes at most one action at a time
#[derive(Default)]
pub struct ActionExecutor {
    run: Option<Run>,
}

impl ActionExecutor {
    pub const fn new() -> Self {
        Self { run: None }
    }

    /// An action is in progress
    pub fn is_busy(&self) -> bool {
        self.run.is_some()
    }

    pub fn current(&self) -> Option<&PlannerAction> {
        self.run.as_ref().map(|run| &run.action)
    }

    /// Index of the primitive in progress
    pub fn primitive_index(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.primitive_index)
    }

    /// Begin executing an action
    ///
    /// Fails with `Busy` while another action is running. No motion starts
    /// until the next `poll`.
    pub fn start(&mut self, action: PlannerAction, config: &RobotConfig) -> Result<(), RobotError> {
        if self.run.is_some() {
            return Err(RobotError::Busy);
        }
        let primitives = action.primitives();
        let steps = primitives
            .first()
            .map(|primitive| primitive.steps(config))
            .unwrap_or_default();
        self.run = Some(Run {
            action,
            primitives,
            primitive_index: 0,
            steps,
            step_index: 0,
            wait_started_us: None,
        });
        Ok(())
    }

    /// Drop the action in progress without a report
    pub fn abandon(&mut self) -> Option<PlannerAction> {
        self.run.take().map(|run| run.action)
    }

    /// Advance the action in progress
    ///
    /// Returns the report once the action has finished or failed.
    pub fn poll<M: Manipulator>(
        &mut self,
        machine: &mut M,
        config: &RobotConfig,
        now_us: u64,
    ) -> Option<ExecutionReport> {
        let run = self.run.as_mut()?;
        let timeout_us = config.wait_timeout_ms as u64 * 1_000;

        let result = loop {
            if run.step_index >= run.steps.len() {
                run.primitive_index += 1;
                match run.primitives.get(run.primitive_index) {
                    Some(next) => {
                        run.steps = next.steps(config);
                        run.step_index = 0;
                        continue;
                    }
                    None => break Ok(()),
                }
            }

            let step = run.steps[run.step_index];
            match execute(step, machine, &mut run.wait_started_us, now_us, timeout_us) {
                Ok(StepOutcome::Done) => {
                    run.wait_started_us = None;
                    run.step_index += 1;
                }
                Ok(StepOutcome::Pending) => return None,
                Err(err) => break Err(err),
            }
        };

        let report = run.report(result);
        self.run = None;
        Some(report)
    }
}

fn execute<M: Manipulator>(
    step: MotionStep,
    machine: &mut M,
    wait_started_us: &mut Option<u64>,
    now_us: u64,
    timeout_us: u64,
) -> Result<StepOutcome, RobotError> {
    // Command rejections surface as a failed step
    let command = |result: Result<(), RobotError>| {
        result
            .map(|()| StepOutcome::Done)
            .map_err(|_| RobotError::MotorError)
    };

    let started = *wait_started_us.get_or_insert(now_us);
    let elapsed_us = now_us.saturating_sub(started);
    let wait = |progress: Progress| match progress {
        Progress::Reached => Ok(StepOutcome::Done),
        Progress::Failed => Err(RobotError::MotorError),
        Progress::Pending if elapsed_us > timeout_us => Err(RobotError::Timeout),
        Progress::Pending => Ok(StepOutcome::Pending),
    };

    match step {
        MotionStep::MoveXy { x, y, period_us } => command(machine.move_xy(x, y, period_us)),
        MotionStep::MoveZ { z, period_us } => command(machine.move_z(z, period_us)),
        MotionStep::GripperOpen => command(machine.gripper_open()),
        MotionStep::GripperClose => command(machine.gripper_close()),
        MotionStep::WaitXy { x, y } => wait(machine.xy_progress(x, y)),
        MotionStep::WaitZ { z } => wait(machine.z_progress(z)),
        MotionStep::SettleGripper { ms } => {
            if elapsed_us < ms as u64 * 1_000 {
                return match machine.gripper_progress() {
                    Progress::Failed => Err(RobotError::MotorError),
                    _ => Ok(StepOutcome::Pending),
                };
            }
            wait(machine.gripper_progress())
        }
    }
}
