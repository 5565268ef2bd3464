//! Homing sequencer
//!
//! Drives the [`HomingState`] machine from the controller's update tick.
//! Each axis pass goes through two phases:
//!
//! ```text
//!   Seeking ──(switch latched && axis stopped)──► BackingOff ──(idle)──► zeroed, homed
//!      │
//!      ├─(axis stopped without capture)──► Failed
//!      └─(travel budget exceeded)────────► axis faulted, Failed
//! ```
//!
//! The sequence advances on capture, so one axis's backoff may overlap the
//! next axis's seek.

use crate::error::RobotError;
use crate::motion::{AxisId, AxisState};
use crate::safety::SwitchId;
use crate::state::{HomingEvent, HomingState};
use crate::traits::Board;

use super::machine::Machine;
use super::{ControllerEvent, Events};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum PassPhase {
    Seeking { origin: i32 },
    BackingOff,
}

#[derive(Debug, Default)]
pub struct HomingSequencer {
    state: HomingState,
    /// Per [`AxisId::index`]
    passes: [Option<PassPhase>; 3],
}

impl HomingSequencer {
    pub const fn new() -> Self {
        Self {
            state: HomingState::Idle,
            passes: [None; 3],
        }
    }

    pub fn state(&self) -> HomingState {
        self.state
    }

    /// A sequence or standalone pass (including a backoff) is running
    pub fn is_active(&self) -> bool {
        self.state.is_homing() || self.passes.iter().any(Option::is_some)
    }

    /// Start the Z → Y → X sequence
    pub fn home_all<B: Board>(
        &mut self,
        machine: &mut Machine<B>,
        events: &mut Events,
    ) -> Result<(), RobotError> {
        if self.is_active() {
            return Err(RobotError::Busy);
        }
        self.apply(HomingEvent::Start, events);
        self.begin_pass(machine, AxisId::Z, events)
    }

    /// Home one axis outside the sequence
    pub fn home_axis<B: Board>(
        &mut self,
        machine: &mut Machine<B>,
        axis: AxisId,
        events: &mut Events,
    ) -> Result<(), RobotError> {
        if self.state.is_homing() || self.passes[axis.index()].is_some() {
            return Err(RobotError::Busy);
        }
        self.apply(HomingEvent::Rearmed, events);
        self.begin_pass(machine, axis, events)
    }

    fn begin_pass<B: Board>(
        &mut self,
        machine: &mut Machine<B>,
        axis: AxisId,
        events: &mut Events,
    ) -> Result<(), RobotError> {
        match machine.begin_homing(axis) {
            Ok(origin) => {
                self.passes[axis.index()] = Some(PassPhase::Seeking { origin });
                Ok(())
            }
            Err(err) => {
                self.fail(machine, events);
                Err(err)
            }
        }
    }

    /// Advance every running pass
    pub fn update<B: Board>(&mut self, machine: &mut Machine<B>, events: &mut Events) {
        for axis in AxisId::ALL {
            match self.passes[axis.index()] {
                Some(PassPhase::Seeking { origin }) => self.update_seek(machine, axis, origin, events),
                Some(PassPhase::BackingOff) => self.update_backoff(machine, axis, events),
                None => {}
            }
        }
    }

    fn update_seek<B: Board>(
        &mut self,
        machine: &mut Machine<B>,
        axis: AxisId,
        origin: i32,
        events: &mut Events,
    ) {
        let homing = machine.axis_is_homing(axis);
        let captured = machine
            .switch(SwitchId::for_axis(axis))
            .map(|switch| switch.was_triggered() || switch.is_triggered())
            .unwrap_or(false);

        if captured && !homing {
            if machine.back_off(axis).is_err() {
                self.fail(machine, events);
                return;
            }
            self.passes[axis.index()] = Some(PassPhase::BackingOff);

            if self.state.axis() == Some(axis) {
                self.apply(HomingEvent::AxisCaptured, events);
                if let Some(next) = self.state.axis() {
                    let _ = self.begin_pass(machine, next, events);
                }
            }
            return;
        }

        if !homing {
            // Stopped by something other than its own switch
            self.fail(machine, events);
            return;
        }

        let travelled = machine
            .axis_position(axis)
            .map(|position| position.abs_diff(origin))
            .unwrap_or(0);
        if travelled > machine.config().homing.axis(axis).max_travel_steps {
            machine.fault_axis(axis);
            self.fail(machine, events);
        }
    }

    fn update_backoff<B: Board>(
        &mut self,
        machine: &mut Machine<B>,
        axis: AxisId,
        events: &mut Events,
    ) {
        match machine.axis_state(axis) {
            AxisState::Idle => {
                self.passes[axis.index()] = None;
                if machine.finish_homing(axis).is_err() {
                    self.fail(machine, events);
                    return;
                }
                let _ = events.push(ControllerEvent::AxisHomed(axis));
            }
            AxisState::Error => self.fail(machine, events),
            AxisState::Moving | AxisState::Homing => {}
        }
    }

    /// Stop every running pass and enter `Error`
    fn fail<B: Board>(&mut self, machine: &mut Machine<B>, events: &mut Events) {
        for axis in AxisId::ALL {
            if self.passes[axis.index()].take().is_some() {
                machine.stop_axis(axis);
            }
        }
        self.apply(HomingEvent::Failed, events);
    }

    fn apply(&mut self, event: HomingEvent, events: &mut Events) {
        let next = self.state.transition(event);
        if next != self.state {
            self.state = next;
            let _ = events.push(ControllerEvent::HomingChanged(next));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotConfig;
    use crate::controller::machine::tests::parts;
    use crate::controller::machine::SwitchSample;
    use crate::motion::MotorId;
    use crate::traits::mock::MockBoard;

    struct Rig {
        machine: Machine<MockBoard>,
        homing: HomingSequencer,
        events: Events,
        now: u64,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                machine: Machine::new(RobotConfig::default(), parts()),
                homing: HomingSequencer::new(),
                events: Events::new(),
                now: 0,
            }
        }

        /// One controller-style update with the given switch levels
        fn step(&mut self, levels: [bool; 3]) {
            for id in SwitchId::ALL {
                let sample = SwitchSample {
                    level_high: levels[id.index()],
                    edge: false,
                };
                self.machine.service_switch(id, sample);
            }
            self.machine.tick(self.now);
            self.homing.update(&mut self.machine, &mut self.events);
            self.now += 100;
        }

        fn states(&self) -> heapless::Vec<HomingState, 8> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    ControllerEvent::HomingChanged(state) => Some(*state),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn test_sequence_runs_z_then_y_then_x() {
        let mut rig = Rig::new();
        rig.homing.home_all(&mut rig.machine, &mut rig.events).unwrap();
        assert_eq!(rig.homing.state(), HomingState::HomingZ);
        assert!(rig.machine.axis_is_homing(AxisId::Z));
        assert!(!rig.machine.axis_is_homing(AxisId::Y));

        let mut levels = [false; 3];
        for (axis, switch) in [(AxisId::Z, SwitchId::Z), (AxisId::Y, SwitchId::Y), (AxisId::X, SwitchId::X)] {
            // Let the axis travel a little, then close its switch
            for _ in 0..10 {
                rig.step(levels);
            }
            assert!(rig.machine.axis_is_homing(axis));
            levels[switch.index()] = true;
            for _ in 0..5 {
                rig.step(levels);
            }
            levels[switch.index()] = false;
        }
        for _ in 0..20_000 {
            rig.step(levels);
        }

        assert_eq!(rig.homing.state(), HomingState::Complete);
        assert_eq!(
            rig.states().as_slice(),
            &[
                HomingState::HomingZ,
                HomingState::HomingY,
                HomingState::HomingX,
                HomingState::Complete
            ]
        );
        assert!(!rig.homing.is_active());
        for id in [MotorId::X, MotorId::Y1, MotorId::Y2, MotorId::Z] {
            let motor = rig.machine.motors().get(id).unwrap();
            assert!(motor.is_homed());
            assert_eq!(motor.position(), 0);
        }
    }

    #[test]
    fn test_capture_waits_for_axis_stop() {
        let mut rig = Rig::new();
        rig.homing.home_all(&mut rig.machine, &mut rig.events).unwrap();
        rig.step([false; 3]);

        // Trigger flag set while the axis still reports homing
        rig.machine.switch_mut(SwitchId::Z).unwrap().trigger();
        assert!(rig.machine.axis_is_homing(AxisId::Z));
        rig.homing.update(&mut rig.machine, &mut rig.events);
        assert_eq!(rig.homing.state(), HomingState::HomingZ);

        rig.machine.stop_axis(AxisId::Z);
        rig.homing.update(&mut rig.machine, &mut rig.events);
        assert_eq!(rig.homing.state(), HomingState::HomingY);
    }

    #[test]
    fn test_latched_switch_captures_without_motion() {
        let mut rig = Rig::new();
        rig.machine.switch_mut(SwitchId::Z).unwrap().trigger();

        rig.homing.home_all(&mut rig.machine, &mut rig.events).unwrap();
        assert!(!rig.machine.axis_is_homing(AxisId::Z));
        rig.homing.update(&mut rig.machine, &mut rig.events);
        assert_eq!(rig.homing.state(), HomingState::HomingY);
    }

    #[test]
    fn test_disabled_axis_fails_sequence() {
        let mut rig = Rig::new();
        rig.machine.motors_mut().get_mut(MotorId::Z).unwrap().enable(false);

        assert_eq!(
            rig.homing.home_all(&mut rig.machine, &mut rig.events),
            Err(RobotError::Disabled)
        );
        assert_eq!(rig.homing.state(), HomingState::Error);
        assert!(!rig.homing.is_active());
    }

    #[test]
    fn test_travel_budget_exceeded_faults_axis() {
        let mut rig = Rig::new();
        rig.homing.home_all(&mut rig.machine, &mut rig.events).unwrap();

        let budget = rig.machine.config().homing.z.max_travel_steps as u64;
        let period = rig.machine.config().speeds.homing_us as u64;
        for _ in 0..(budget + 5) * period / 100 {
            rig.step([false; 3]);
        }

        assert_eq!(rig.homing.state(), HomingState::Error);
        assert_eq!(rig.machine.axis_state(AxisId::Z), AxisState::Error);
    }

    #[test]
    fn test_external_stop_fails_pass() {
        let mut rig = Rig::new();
        rig.homing.home_all(&mut rig.machine, &mut rig.events).unwrap();
        rig.step([false; 3]);
        rig.machine.stop_axis(AxisId::Z);
        rig.step([false; 3]);

        assert_eq!(rig.homing.state(), HomingState::Error);
    }

    #[test]
    fn test_standalone_axis_rearms_after_error() {
        let mut rig = Rig::new();
        rig.machine.motors_mut().get_mut(MotorId::Z).unwrap().enable(false);
        let _ = rig.homing.home_all(&mut rig.machine, &mut rig.events);
        assert_eq!(rig.homing.state(), HomingState::Error);

        rig.homing
            .home_axis(&mut rig.machine, AxisId::X, &mut rig.events)
            .unwrap();
        assert_eq!(rig.homing.state(), HomingState::Idle);
        assert!(rig.homing.is_active());
        assert!(rig.machine.axis_is_homing(AxisId::X));

        // A standalone capture does not move the state machine
        rig.machine.switch_mut(SwitchId::X).unwrap().trigger();
        rig.machine.stop_axis(AxisId::X);
        rig.homing.update(&mut rig.machine, &mut rig.events);
        assert_eq!(rig.homing.state(), HomingState::Idle);
    }

    #[test]
    fn test_home_all_rejected_while_active() {
        let mut rig = Rig::new();
        rig.homing.home_all(&mut rig.machine, &mut rig.events).unwrap();
        assert_eq!(
            rig.homing.home_all(&mut rig.machine, &mut rig.events),
            Err(RobotError::Busy)
        );
    }
}
