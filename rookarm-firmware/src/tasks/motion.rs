//! Motion task
//!
//! Owns the robot controller and the limit switch inputs. A fixed-rate
//! ticker drives `RobotController::update`; switch edges wake the task
//! between ticks. Host commands are applied after each tick so every
//! controller call happens on this one task.

use defmt::*;
use embassy_futures::select::{select, select_array, Either};
use embassy_time::{Duration, Instant, Ticker};

use rookarm_core::command::{dispatch, event_for};
use rookarm_core::state::HomingState;
use rookarm_core::{ControllerEvent, RobotController};
use rookarm_protocol::Outbound;

use crate::board::RpBoard;
use crate::channels::{COMMAND_CHANNEL, OUTBOUND_CHANNEL};
use crate::tasks::limit_watch::LimitWatch;

/// Motion tick period in microseconds
pub const MOTION_TICK_US: u64 = 100;

/// Motion task - steps the axes and serves host commands
#[embassy_executor::task]
pub async fn motion_task(
    mut controller: RobotController<RpBoard>,
    mut limits: [LimitWatch; 3],
) {
    info!("Motion task started");

    let mut ticker = Ticker::every(Duration::from_micros(MOTION_TICK_US));

    loop {
        let woke = {
            let [x, y, z] = &mut limits;
            let edges = select_array([x.wait_for_edge(), y.wait_for_edge(), z.wait_for_edge()]);
            select(ticker.next(), edges).await
        };
        if let Either::Second(((), index)) = woke {
            limits[index].on_edge(Instant::now().as_millis());
            continue;
        }

        let samples = limits.each_ref().map(LimitWatch::sample);

        let now_us = Instant::now().as_micros();
        for event in controller.update(now_us, &samples) {
            log_event(&event);
            if let Some(telemetry) = event_for(&event) {
                send(Outbound::Event(telemetry));
            }
        }

        while let Ok(command) = COMMAND_CHANNEL.try_receive() {
            debug!("Command: {:?}", command);
            let response = dispatch(&mut controller, &command);
            send(Outbound::Reply(response));
        }
    }
}

/// Queue a message for the host, dropping it if the UART is backed up
fn send(message: Outbound) {
    if OUTBOUND_CHANNEL.try_send(message).is_err() {
        warn!("Outbound channel full, dropping message");
    }
}

fn log_event(event: &ControllerEvent) {
    match event {
        ControllerEvent::LimitTriggered(switch) => {
            warn!("Limit {} triggered", switch.name());
        }
        ControllerEvent::LimitReleased(switch) => {
            debug!("Limit {} released", switch.name());
        }
        ControllerEvent::MotionComplete(motor) => {
            trace!("Motor {} reached target", motor.name());
        }
        ControllerEvent::PairDiverged => {
            warn!("Y pair diverged, stepping independently");
        }
        ControllerEvent::PairResynchronized => {
            info!("Y pair resynchronized");
        }
        ControllerEvent::HomingChanged(state) => {
            if *state == HomingState::Error {
                error!("Homing failed");
            } else {
                info!("Homing: {}", state.name());
            }
        }
        ControllerEvent::AxisHomed(axis) => {
            info!("Axis {} homed", axis.name());
        }
        ControllerEvent::ActionStarted(action) => {
            info!("Action {} started", action.name());
        }
        ControllerEvent::ActionFinished(report) => match report.result {
            Ok(()) => info!(
                "Action {} done ({} primitives)",
                report.action.name(),
                report.primitives_completed
            ),
            Err(e) => error!(
                "Action {} failed after {} primitives: {}",
                report.action.name(),
                report.primitives_completed,
                e
            ),
        },
    }
}
