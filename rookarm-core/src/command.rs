//! Command dispatch
//!
//! Maps decoded protocol commands onto controller calls and controller
//! events onto protocol events. Names and squares are parsed here, so a
//! malformed command is rejected before any motion starts.

use rookarm_protocol::{
    ActionRequest, Command, ErrorCode, Event, HomingCommand, Name, Response, SquareText,
    StepperCommand,
};

use crate::config::MIN_STEP_PERIOD_US;
use crate::controller::{ControllerEvent, RobotController};
use crate::error::RobotError;
use crate::motion::{AxisId, MotorSelector};
use crate::planner::{ChessSquare, PlannerAction};
use crate::traits::Board;

fn axis(name: &str) -> Result<AxisId, RobotError> {
    AxisId::parse(name).ok_or(RobotError::InvalidArgument)
}

fn selector(name: &str) -> Result<MotorSelector, RobotError> {
    MotorSelector::parse(name).ok_or(RobotError::InvalidArgument)
}

fn period(speed_us: u32) -> Result<u32, RobotError> {
    if speed_us < MIN_STEP_PERIOD_US {
        Err(RobotError::InvalidArgument)
    } else {
        Ok(speed_us)
    }
}

fn reply(result: Result<(), RobotError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(err) => Response::Error(err.into()),
    }
}

/// Execute one command and build its reply
pub fn dispatch<B: Board>(controller: &mut RobotController<B>, command: &Command) -> Response {
    match command {
        Command::MoveTo { x, y, z, speed_us } => reply(
            period(*speed_us).and_then(|period_us| controller.move_to(*x, *y, *z, period_us)),
        ),
        Command::Home => reply(controller.home()),
        Command::HomeAll => reply(controller.home_all()),
        Command::HomeAxis { axis: name } => {
            reply(axis(name).and_then(|axis| controller.home_axis(axis)))
        }
        Command::GripperOpen => reply(controller.gripper_open()),
        Command::GripperClose => reply(controller.gripper_close()),
        Command::ServoSetAngle { id, degrees } => reply(controller.servo_set_angle(*id, *degrees)),
        Command::ServoEnable { id, enable } => reply(controller.servo_enable(*id, *enable)),
        Command::Execute(request) => reply(
            PlannerAction::try_from(request).and_then(|action| controller.enqueue(action)),
        ),
        Command::Stepper(stepper) => dispatch_stepper(controller, stepper),
        Command::Homing(homing) => dispatch_homing(controller, homing),
        Command::Status => Response::Status(controller.status()),
    }
}

fn dispatch_stepper<B: Board>(
    controller: &mut RobotController<B>,
    command: &StepperCommand,
) -> Response {
    match command {
        StepperCommand::Move {
            motor,
            steps,
            speed_us,
        } => {
            let default_us = controller.config().speeds.default_us;
            reply(selector(motor).and_then(|target| {
                let period_us = period(speed_us.unwrap_or(default_us))?;
                controller.stepper_move(target, *steps, period_us)
            }))
        }
        StepperCommand::Stop { target } => reply(selector(target).map(|target| {
            controller.stepper_stop(target);
        })),
        StepperCommand::Status { motor } => {
            let target = motor.as_deref().map(selector).transpose();
            match target.and_then(|target| controller.stepper_report(target)) {
                Ok(report) => Response::Stepper(report),
                Err(err) => Response::Error(err.into()),
            }
        }
        StepperCommand::Enable { target, enable } => reply(
            selector(target).and_then(|target| controller.stepper_enable(target, *enable)),
        ),
        StepperCommand::Home { target } => {
            reply(selector(target).and_then(|target| controller.stepper_zero(target)))
        }
    }
}

fn dispatch_homing<B: Board>(
    controller: &mut RobotController<B>,
    command: &HomingCommand,
) -> Response {
    match command {
        HomingCommand::Start { axis: name } if name.eq_ignore_ascii_case("all") => {
            reply(controller.home_all())
        }
        HomingCommand::Start { axis: name } => {
            reply(axis(name).and_then(|axis| controller.home_axis(axis)))
        }
        HomingCommand::Status => Response::Homing(controller.homing_report()),
    }
}

fn name(text: &str) -> Name {
    Name::try_from(text).unwrap_or_default()
}

/// Telemetry for a controller event; `None` for events kept on-board
pub fn event_for(event: &ControllerEvent) -> Option<Event> {
    match event {
        ControllerEvent::LimitTriggered(switch) => Some(Event::LimitTriggered {
            switch: name(switch.name()),
        }),
        ControllerEvent::HomingChanged(state) => Some(Event::HomingChanged {
            state: name(state.name()),
        }),
        ControllerEvent::ActionFinished(report) => Some(Event::ActionFinished {
            action: ActionRequest::from(&report.action),
            error: report.result.err().map(ErrorCode::from),
            primitives: report.primitives_completed,
        }),
        _ => None,
    }
}

/// Relay a move reported by the board scanner
///
/// Squares that do not parse are dropped.
pub fn relay_move_detected(from: &str, to: &str) -> Option<Event> {
    let text = |square: &str| -> Option<SquareText> {
        ChessSquare::parse(square).ok().map(ChessSquare::to_text)
    };
    Some(Event::MoveDetected {
        from: text(from)?,
        to: text(to)?,
    })
}
