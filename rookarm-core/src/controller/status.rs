//! Status record builders

use heapless::Vec;
use rookarm_protocol::{AxisReport, HomingReport, Name, StatusReport, StepperReport, SwitchReport};

use super::machine::Machine;
use super::RobotController;
use crate::error::RobotError;
use crate::motion::{Axis, MotorId, MotorSelector};
use crate::safety::SwitchId;
use crate::state::HomingState;
use crate::traits::Board;

fn name(text: &str) -> Name {
    Name::try_from(text).unwrap_or_default()
}

fn axis_report<P: rookarm_hal::OutputPin>(id: MotorId, axis: &Axis<P>) -> AxisReport {
    AxisReport {
        motor: name(id.name()),
        position: axis.position(),
        moving: axis.is_active(),
        state: name(axis.state().name()),
        enabled: axis.is_enabled(),
        homed: axis.is_homed(),
    }
}

fn switch_report<B: Board>(machine: &Machine<B>) -> SwitchReport {
    let latched = |id: SwitchId| {
        machine
            .switch(id)
            .map(|switch| switch.is_triggered())
            .unwrap_or(false)
    };
    SwitchReport {
        x_triggered: latched(SwitchId::X),
        y_triggered: latched(SwitchId::Y),
        z_triggered: latched(SwitchId::Z),
    }
}

pub(super) fn status_report<B: Board>(controller: &RobotController<B>) -> StatusReport {
    let machine = &controller.machine;
    let homing_state = controller.homing.state();
    StatusReport {
        position: machine.position(),
        busy: controller.is_busy(),
        homing_state: name(homing_state.name()),
        is_homing: controller.homing.is_active(),
        axes: machine
            .motors()
            .iter()
            .map(|(id, axis)| axis_report(id, axis))
            .collect(),
        all_idle: machine.motors().all_idle(),
        switches: switch_report(machine),
        queued: controller.queue.len() as u8,
    }
}

/// Report one motor, the Y pair with its alignment, or every motor
pub(super) fn stepper_report<B: Board>(
    machine: &Machine<B>,
    selector: MotorSelector,
) -> Result<StepperReport, RobotError> {
    let motors = machine.motors();
    let mut axes = Vec::new();
    let mut y_aligned = None;
    let mut all_idle = None;

    match selector {
        MotorSelector::One(id) => {
            let _ = axes.push(axis_report(id, motors.get(id)?));
        }
        MotorSelector::YPair => {
            let y1 = motors.get(MotorId::Y1)?;
            let y2 = motors.get(MotorId::Y2)?;
            let _ = axes.push(axis_report(MotorId::Y1, y1));
            let _ = axes.push(axis_report(MotorId::Y2, y2));
            y_aligned = Some(y1.position() == y2.position() && y1.target() == y2.target());
        }
        MotorSelector::All => {
            axes = motors.iter().map(|(id, axis)| axis_report(id, axis)).collect();
            all_idle = Some(motors.all_idle());
        }
    }

    Ok(StepperReport {
        axes,
        y_aligned,
        all_idle,
    })
}

pub(super) fn homing_report<B: Board>(
    machine: &Machine<B>,
    state: HomingState,
    is_homing: bool,
) -> HomingReport {
    HomingReport {
        state: name(state.name()),
        is_homing,
        switches: switch_report(machine),
    }
}
