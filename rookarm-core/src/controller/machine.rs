//! Owned hardware of the robot
//!
//! `Machine` holds every axis, limit switch and servo by value. The
//! controller reaches hardware only through it, and the executor only
//! through its [`Manipulator`] impl.

use rookarm_protocol::Position;

use crate::config::{GripperKind, RobotConfig};
use crate::error::RobotError;
use crate::motion::{Axis, AxisId, AxisPins, AxisState, BankTick, MotorBank, MotorId};
use crate::safety::{LimitSwitch, SwitchEvent, SwitchId};
use crate::servo::{Servo, MAX_SERVOS};
use crate::traits::{Board, Manipulator, Progress};

/// One safety-poll sample of a switch input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchSample {
    /// Raw pin level
    pub level_high: bool,
    /// An interrupt edge was latched since the last tick
    pub edge: bool,
}

/// Hardware handed to the controller at startup
pub struct MachineParts<B: Board> {
    /// STEP/DIR/ENABLE lines per [`MotorId::index`]; `None` when not fitted
    pub axes: [Option<AxisPins<B::Pin>>; MotorId::COUNT],
    /// Limit switches wired, per [`SwitchId::index`]
    pub switches: [bool; 3],
    pub servo: Option<B::Servo>,
    pub delay: B::Delay,
}

pub struct Machine<B: Board> {
    config: RobotConfig,
    motors: MotorBank<B::Pin>,
    switches: [Option<LimitSwitch>; 3],
    servos: [Option<Servo<B::Servo>>; MAX_SERVOS],
    delay: B::Delay,
    /// Last commanded jaw position of a stepper gripper
    gripper_target: Option<i32>,
}

impl<B: Board> Machine<B> {
    /// Build the machine with every fitted driver enabled
    pub fn new(config: RobotConfig, parts: MachineParts<B>) -> Self {
        let MachineParts {
            axes,
            switches: wired,
            servo,
            delay,
        } = parts;

        let mut index = 0;
        let slots = axes.map(|pins| {
            let id = MotorId::ALL[index];
            index += 1;
            pins.map(|pins| Axis::new(pins, config.motors.motor(id).direction_inverted))
        });
        let mut motors = MotorBank::new(slots);
        motors.enable_all(true);

        let switches = SwitchId::ALL.map(|id| {
            if !wired[id.index()] {
                return None;
            }
            let mut switch = LimitSwitch::new(id, &config.switches);
            for &motor in id.axis().motors() {
                if motors.is_fitted(motor) {
                    let _ = switch.attach(motor);
                }
            }
            Some(switch)
        });

        Self {
            config,
            motors,
            switches,
            servos: [servo.map(Servo::new)],
            delay,
            gripper_target: None,
        }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn motors(&self) -> &MotorBank<B::Pin> {
        &self.motors
    }

    pub fn motors_mut(&mut self) -> &mut MotorBank<B::Pin> {
        &mut self.motors
    }

    pub fn switch(&self, id: SwitchId) -> Result<&LimitSwitch, RobotError> {
        self.switches[id.index()]
            .as_ref()
            .ok_or(RobotError::DeviceUnavailable)
    }

    pub fn switch_mut(&mut self, id: SwitchId) -> Result<&mut LimitSwitch, RobotError> {
        self.switches[id.index()]
            .as_mut()
            .ok_or(RobotError::DeviceUnavailable)
    }

    pub fn switches(&self) -> impl Iterator<Item = &LimitSwitch> {
        self.switches.iter().flatten()
    }

    pub fn servo_mut(&mut self, id: u8) -> Result<&mut Servo<B::Servo>, RobotError> {
        self.servos
            .get_mut(id as usize)
            .ok_or(RobotError::InvalidArgument)?
            .as_mut()
            .ok_or(RobotError::DeviceUnavailable)
    }

    pub fn servo(&self, id: u8) -> Result<&Servo<B::Servo>, RobotError> {
        self.servos
            .get(id as usize)
            .ok_or(RobotError::InvalidArgument)?
            .as_ref()
            .ok_or(RobotError::DeviceUnavailable)
    }

    /// Gantry position; unfitted axes read 0
    pub fn position(&self) -> Position {
        let read = |axis: AxisId| self.axis_position(axis).unwrap_or(0);
        Position {
            x: read(AxisId::X),
            y: read(AxisId::Y),
            z: read(AxisId::Z),
        }
    }

    /// Position of the axis's first motor
    pub fn axis_position(&self, axis: AxisId) -> Result<i32, RobotError> {
        Ok(self.motors.get(axis.motors()[0])?.position())
    }

    fn axis_motors(&self, axis: AxisId) -> impl Iterator<Item = Result<&Axis<B::Pin>, RobotError>> + '_ {
        axis.motors().iter().map(|&id| self.motors.get(id))
    }

    /// Every motor of the axis is fitted, enabled and idle
    pub fn check_axis_ready(&self, axis: AxisId) -> Result<(), RobotError> {
        for motor in self.axis_motors(axis) {
            motor?.check_ready()?;
        }
        Ok(())
    }

    pub fn axis_is_homing(&self, axis: AxisId) -> bool {
        self.axis_motors(axis)
            .flatten()
            .any(|motor| motor.is_homing())
    }

    pub fn axis_state(&self, axis: AxisId) -> AxisState {
        let mut state = AxisState::Idle;
        for motor in self.axis_motors(axis).flatten() {
            match motor.state() {
                AxisState::Error => return AxisState::Error,
                AxisState::Idle => {}
                other => state = other,
            }
        }
        state
    }

    /// Start a relative move of every motor of the axis
    pub fn move_axis(&mut self, axis: AxisId, delta: i32, period_us: u32) -> Result<(), RobotError> {
        match axis {
            AxisId::Y => self.motors.y_pair()?.move_steps_sync(delta, period_us),
            _ => self.motors.get_mut(axis.motors()[0])?.move_steps(delta, period_us),
        }
    }

    /// Steps from the axis position to `target`
    ///
    /// Fails with `InvalidArgument` when the distance does not fit an `i32`.
    pub fn delta_to(&self, axis: AxisId, target: i32) -> Result<i32, RobotError> {
        target
            .checked_sub(self.axis_position(axis)?)
            .ok_or(RobotError::InvalidArgument)
    }

    /// Start an absolute move of the axis
    pub fn move_axis_to(&mut self, axis: AxisId, target: i32, period_us: u32) -> Result<(), RobotError> {
        let delta = self.delta_to(axis, target)?;
        self.move_axis(axis, delta, period_us)
    }

    /// Emergency-stop every motor of the axis
    pub fn stop_axis(&mut self, axis: AxisId) -> bool {
        let mut stopped = false;
        for &id in axis.motors() {
            if let Ok(motor) = self.motors.get_mut(id) {
                stopped |= motor.emergency_stop();
            }
        }
        stopped
    }

    pub fn fault_axis(&mut self, axis: AxisId) {
        for &id in axis.motors() {
            if let Ok(motor) = self.motors.get_mut(id) {
                motor.fault();
            }
        }
    }

    /// Start travel toward the axis's limit switch
    ///
    /// Clears the switch's trigger flag first. An axis whose switch is
    /// already latched is left standing; the caller sees it captured on
    /// the next update. Returns the position the pass started from.
    pub fn begin_homing(&mut self, axis: AxisId) -> Result<i32, RobotError> {
        let homing = *self.config.homing.axis(axis);
        let period_us = self.config.speeds.homing_us;

        self.check_axis_ready(axis)?;
        let switch = self.switch_mut(SwitchId::for_axis(axis))?;
        switch.clear_triggered();
        let latched = switch.is_triggered();
        let origin = self.axis_position(axis)?;

        if !latched {
            match axis {
                AxisId::Y => self
                    .motors
                    .y_pair()?
                    .start_homing_sync(homing.direction, period_us)?,
                _ => self
                    .motors
                    .get_mut(axis.motors()[0])?
                    .start_homing(homing.direction, period_us)?,
            }
        }
        Ok(origin)
    }

    /// Move the axis off its switch after a capture
    pub fn back_off(&mut self, axis: AxisId) -> Result<(), RobotError> {
        let homing = *self.config.homing.axis(axis);
        let delta = homing.direction.opposite().step() * homing.backoff_steps as i32;
        self.move_axis(axis, delta, self.config.speeds.homing_us)
    }

    /// Establish the axis reference at the current position
    pub fn finish_homing(&mut self, axis: AxisId) -> Result<(), RobotError> {
        for &id in axis.motors() {
            let motor = self.motors.get_mut(id)?;
            motor.set_position(0)?;
            motor.set_homed(true);
        }
        Ok(())
    }

    /// Zero the counters of the given motors without motion
    ///
    /// The motors lose their homed flag.
    pub fn zero_motors(&mut self, ids: &[MotorId]) -> Result<(), RobotError> {
        for &id in ids {
            if self.motors.get(id)?.is_active() {
                return Err(RobotError::Busy);
            }
        }
        for &id in ids {
            let motor = self.motors.get_mut(id)?;
            motor.set_position(0)?;
            motor.set_homed(false);
        }
        if ids.contains(&MotorId::Gripper) {
            self.gripper_target = None;
        }
        Ok(())
    }

    /// Run both safety paths for one switch
    ///
    /// A latch from either path stops the attached motors before this
    /// returns.
    pub fn service_switch(&mut self, id: SwitchId, sample: SwitchSample) -> Option<SwitchEvent> {
        let switch = self.switches[id.index()].as_mut()?;
        let active = switch.is_active_level(sample.level_high);
        let from_edge = if sample.edge {
            switch.on_edge(active)
        } else {
            None
        };
        let polled = switch.poll(active);
        let event = from_edge.or(polled);

        if event == Some(SwitchEvent::Triggered) {
            for &motor in switch.attached() {
                if let Ok(axis) = self.motors.get_mut(motor) {
                    axis.emergency_stop();
                }
            }
        }
        event
    }

    /// Tick every motor once
    pub fn tick(&mut self, now_us: u64) -> BankTick {
        self.motors.tick_all(now_us, &mut self.delay)
    }

    fn progress(&self, axes: &[(AxisId, i32)]) -> Progress {
        let mut reached = true;
        for &(axis, target) in axes {
            match self.axis_state(axis) {
                AxisState::Error => return Progress::Failed,
                AxisState::Moving | AxisState::Homing => return Progress::Pending,
                AxisState::Idle => {}
            }
            let on_target = axis.motors().iter().all(|&id| {
                self.motors
                    .get(id)
                    .map(|motor| motor.position() == target)
                    .unwrap_or(false)
            });
            reached &= on_target;
        }
        if reached {
            Progress::Reached
        } else {
            Progress::Failed
        }
    }

    fn gripper_to(&mut self, open: bool) -> Result<(), RobotError> {
        match self.config.gripper.kind {
            GripperKind::Servo {
                servo,
                open_angle,
                closed_angle,
            } => {
                let servo = self.servo_mut(servo)?;
                servo.set_angle(if open { open_angle } else { closed_angle })?;
                servo.enable(true);
                Ok(())
            }
            GripperKind::Stepper {
                open_position,
                closed_position,
                period_us,
            } => {
                let target = if open { open_position } else { closed_position };
                let motor = self.motors.get_mut(MotorId::Gripper)?;
                let delta = target
                    .checked_sub(motor.position())
                    .ok_or(RobotError::InvalidArgument)?;
                motor.move_steps(delta, period_us)?;
                self.gripper_target = Some(target);
                Ok(())
            }
        }
    }
}

impl<B: Board> Manipulator for Machine<B> {
    fn move_xy(&mut self, x: i32, y: i32, period_us: u32) -> Result<(), RobotError> {
        self.check_axis_ready(AxisId::X)?;
        self.check_axis_ready(AxisId::Y)?;
        let dx = self.delta_to(AxisId::X, x)?;
        let dy = self.delta_to(AxisId::Y, y)?;
        self.move_axis(AxisId::X, dx, period_us)?;
        self.move_axis(AxisId::Y, dy, period_us)
    }

    fn move_z(&mut self, z: i32, period_us: u32) -> Result<(), RobotError> {
        self.move_axis_to(AxisId::Z, z, period_us)
    }

    fn xy_progress(&self, x: i32, y: i32) -> Progress {
        self.progress(&[(AxisId::X, x), (AxisId::Y, y)])
    }

    fn z_progress(&self, z: i32) -> Progress {
        self.progress(&[(AxisId::Z, z)])
    }

    fn gripper_open(&mut self) -> Result<(), RobotError> {
        self.gripper_to(true)
    }

    fn gripper_close(&mut self) -> Result<(), RobotError> {
        self.gripper_to(false)
    }

    fn gripper_progress(&self) -> Progress {
        let Some(target) = self.gripper_target else {
            return Progress::Reached;
        };
        if matches!(self.config.gripper.kind, GripperKind::Servo { .. }) {
            return Progress::Reached;
        }
        match self.motors.get(MotorId::Gripper) {
            Ok(motor) => match motor.state() {
                AxisState::Error => Progress::Failed,
                AxisState::Moving | AxisState::Homing => Progress::Pending,
                AxisState::Idle if motor.position() == target => Progress::Reached,
                AxisState::Idle => Progress::Failed,
            },
            Err(_) => Progress::Failed,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::traits::mock::{MockBoard, MockPin, MockServo, NoopDelay};

    pub(crate) fn pins() -> AxisPins<MockPin> {
        AxisPins {
            step: MockPin::new(),
            dir: MockPin::new(),
            enable: Some(MockPin::new()),
        }
    }

    pub(crate) fn parts() -> MachineParts<MockBoard> {
        MachineParts {
            axes: [Some(pins()), Some(pins()), Some(pins()), Some(pins()), Some(pins())],
            switches: [true; 3],
            servo: Some(MockServo::default()),
            delay: NoopDelay,
        }
    }

    /// Tick every 100 µs until the predicate holds
    fn run_until(
        machine: &mut Machine<MockBoard>,
        now: &mut u64,
        done: impl Fn(&Machine<MockBoard>) -> bool,
    ) {
        for _ in 0..1_000_000 {
            if done(machine) {
                return;
            }
            machine.tick(*now);
            *now += 100;
        }
        panic!("condition never reached");
    }

    #[test]
    fn test_switches_attach_to_axis_motors() {
        let machine = Machine::new(RobotConfig::default(), parts());
        assert_eq!(
            machine.switch(SwitchId::Y).unwrap().attached(),
            &[MotorId::Y1, MotorId::Y2]
        );
        assert_eq!(machine.switch(SwitchId::Z).unwrap().attached(), &[MotorId::Z]);
    }

    #[test]
    fn test_missing_switch_is_unavailable() {
        let mut parts = parts();
        parts.switches = [true, true, false];
        let mut machine = Machine::new(RobotConfig::default(), parts);

        assert!(machine.switch(SwitchId::Z).is_err());
        assert_eq!(machine.begin_homing(AxisId::Z), Err(RobotError::DeviceUnavailable));
    }

    #[test]
    fn test_move_xy_reaches_target() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        let mut now = 0;
        machine.move_xy(30, -20, 200).unwrap();
        assert_eq!(machine.xy_progress(30, -20), Progress::Pending);

        run_until(&mut machine, &mut now, |m| m.xy_progress(30, -20) != Progress::Pending);
        assert_eq!(machine.xy_progress(30, -20), Progress::Reached);
        assert_eq!(machine.position(), Position { x: 30, y: -20, z: 0 });
    }

    #[test]
    fn test_move_xy_checks_both_axes_first() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        machine.motors_mut().get_mut(MotorId::Y2).unwrap().enable(false);

        assert_eq!(machine.move_xy(100, 100, 200), Err(RobotError::Disabled));
        assert!(machine.motors().get(MotorId::X).unwrap().is_idle());
    }

    #[test]
    fn test_stopped_short_reports_failed() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        machine.move_z(50, 100).unwrap();
        machine.tick(0);
        machine.stop_axis(AxisId::Z);

        assert_eq!(machine.z_progress(50), Progress::Failed);
    }

    #[test]
    fn test_switch_trigger_stops_attached_motors() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        machine.move_axis(AxisId::Y, 1000, 100).unwrap();
        machine.move_axis(AxisId::X, 1000, 100).unwrap();
        machine.tick(0);

        let event = machine.service_switch(
            SwitchId::Y,
            SwitchSample {
                level_high: true,
                edge: true,
            },
        );
        assert_eq!(event, Some(SwitchEvent::Triggered));
        assert!(machine.motors().get(MotorId::Y1).unwrap().is_idle());
        assert!(machine.motors().get(MotorId::Y2).unwrap().is_idle());
        assert!(machine.motors().get(MotorId::X).unwrap().is_active());
    }

    #[test]
    fn test_poll_path_without_edge() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        let sample = SwitchSample {
            level_high: true,
            edge: false,
        };
        let trigger_samples = machine.config().switches.trigger_samples;
        for _ in 1..trigger_samples {
            assert_eq!(machine.service_switch(SwitchId::X, sample), None);
        }
        assert_eq!(
            machine.service_switch(SwitchId::X, sample),
            Some(SwitchEvent::Triggered)
        );
    }

    #[test]
    fn test_stepper_gripper_progress() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        let mut now = 0;
        machine.gripper_open().unwrap();
        assert_eq!(machine.gripper_progress(), Progress::Pending);

        run_until(&mut machine, &mut now, |m| m.gripper_progress() != Progress::Pending);
        assert_eq!(machine.gripper_progress(), Progress::Reached);
        assert_eq!(machine.motors().get(MotorId::Gripper).unwrap().position(), -200);
    }

    #[test]
    fn test_servo_gripper_sets_angle() {
        let mut config = RobotConfig::default();
        config.gripper.kind = GripperKind::Servo {
            servo: 0,
            open_angle: 90,
            closed_angle: 10,
        };
        let mut machine = Machine::new(config, parts());

        machine.gripper_close().unwrap();
        let servo = machine.servo(0).unwrap();
        assert_eq!(servo.angle(), 10);
        assert!(servo.is_enabled());
        assert_eq!(machine.gripper_progress(), Progress::Reached);
    }

    #[test]
    fn test_zero_motors_clears_homed() {
        let mut machine = Machine::new(RobotConfig::default(), parts());
        machine.motors_mut().get_mut(MotorId::X).unwrap().set_homed(true);
        machine.zero_motors(&[MotorId::X]).unwrap();
        assert!(!machine.motors().get(MotorId::X).unwrap().is_homed());
    }
}
