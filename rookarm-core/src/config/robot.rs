//! Robot configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;

use crate::motion::{AxisId, Direction, MotorId};

/// Shortest accepted step period; must exceed the step pulse width
pub const MIN_STEP_PERIOD_US: u32 = 20;

/// Largest servo angle in degrees
pub const MAX_SERVO_ANGLE: u16 = 180;

/// Steps per millimetre of the reference mechanics
const STEPS_PER_MM: i32 = 20;

/// Chess square edge length in millimetres
const SQUARE_SIZE_MM: i32 = 70;

/// Configuration validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Square size must be positive
    InvalidSquareSize,
    /// A step period is below [`MIN_STEP_PERIOD_US`]
    StepPeriodTooShort,
    /// Trigger debounce must be at least one sample
    InvalidTriggerDebounce,
    /// Release debounce must be longer than trigger debounce
    ReleaseNotSlowerThanTrigger,
    /// Servo angle above [`MAX_SERVO_ANGLE`]
    ServoAngleOutOfRange,
    /// Homing travel budget must be positive
    InvalidHomingTravel,
    /// Encoded configuration could not be decoded
    Decode,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConfigError::InvalidSquareSize => "board.square_steps must be positive",
            ConfigError::StepPeriodTooShort => "step period below 20 us",
            ConfigError::InvalidTriggerDebounce => "switches.trigger_samples must be at least 1",
            ConfigError::ReleaseNotSlowerThanTrigger => {
                "switches.release_samples must exceed trigger_samples"
            }
            ConfigError::ServoAngleOutOfRange => "servo angle above 180 degrees",
            ConfigError::InvalidHomingTravel => "homing max_travel_steps must be positive",
            ConfigError::Decode => "encoded configuration is corrupt",
        };
        f.write_str(text)
    }
}

/// Mapping from chess squares to gantry steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardGeometry {
    /// X steps of the centre of file a
    pub origin_x: i32,
    /// Y steps of the centre of rank 1
    pub origin_y: i32,
    /// Steps between neighbouring square centres
    pub square_steps: i32,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            square_steps: STEPS_PER_MM * SQUARE_SIZE_MM,
        }
    }
}

/// Z positions (steps)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZHeights {
    /// Safe height for XY travel
    pub travel: i32,
    /// Height at which a piece is gripped
    pub pick: i32,
    /// Height at which a piece is released
    pub place: i32,
}

impl Default for ZHeights {
    fn default() -> Self {
        Self {
            travel: 0,
            pick: 2000,
            place: 1900,
        }
    }
}

/// Off-board drop point for captured pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraveyardConfig {
    pub x: i32,
    pub y: i32,
}

impl Default for GraveyardConfig {
    fn default() -> Self {
        Self { x: -500, y: 0 }
    }
}

/// Step periods in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeedConfig {
    /// XY moves between squares
    pub travel_us: u32,
    /// Z descents and ascents
    pub z_us: u32,
    /// Diagnostics moves without an explicit speed
    pub default_us: u32,
    pub fast_us: u32,
    pub slow_us: u32,
    /// Seeking a limit switch
    pub homing_us: u32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            travel_us: 800,
            z_us: 1200,
            default_us: 1000,
            fast_us: 200,
            slow_us: 2000,
            homing_us: 2000,
        }
    }
}

impl SpeedConfig {
    fn periods(&self) -> [u32; 6] {
        [
            self.travel_us,
            self.z_us,
            self.default_us,
            self.fast_us,
            self.slow_us,
            self.homing_us,
        ]
    }
}

/// How the gripper is actuated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GripperKind {
    /// Hobby servo with fixed jaw angles
    Servo {
        servo: u8,
        open_angle: u16,
        closed_angle: u16,
    },
    /// Gripper stepper driven to absolute jaw positions
    Stepper {
        open_position: i32,
        closed_position: i32,
        period_us: u32,
    },
}

/// Gripper actuation and settle delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GripperConfig {
    pub kind: GripperKind,
    /// Wait after opening before the next motion
    pub open_delay_ms: u32,
    /// Wait after closing before lifting
    pub close_delay_ms: u32,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            kind: GripperKind::Stepper {
                open_position: -200,
                closed_position: 0,
                period_us: SpeedConfig::default().slow_us,
            },
            open_delay_ms: 200,
            close_delay_ms: 300,
        }
    }
}

/// Limit switch electrical and debounce settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwitchConfig {
    /// Consecutive active polls before latching
    pub trigger_samples: u16,
    /// Consecutive inactive polls before releasing a latch
    pub release_samples: u16,
    /// Switch reads high when pressed
    pub active_high: bool,
    /// Minimum spacing of accepted edge interrupts
    pub isr_debounce_ms: u32,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            trigger_samples: 3,
            release_samples: 50,
            active_high: true,
            isr_debounce_ms: 50,
        }
    }
}

/// Homing parameters of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HomingAxisConfig {
    /// Direction toward the switch
    pub direction: Direction,
    /// Steps allowed while seeking before the pass fails
    pub max_travel_steps: u32,
    /// Steps moved away from the switch after capture
    pub backoff_steps: u32,
}

impl HomingAxisConfig {
    /// Seek budget of 110% of the axis travel
    const fn for_travel(travel_steps: u32) -> Self {
        Self {
            direction: Direction::Reverse,
            max_travel_steps: travel_steps + travel_steps / 10,
            backoff_steps: 2 * STEPS_PER_MM as u32,
        }
    }
}

/// Homing parameters of every axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HomingConfig {
    pub x: HomingAxisConfig,
    pub y: HomingAxisConfig,
    pub z: HomingAxisConfig,
}

impl Default for HomingConfig {
    fn default() -> Self {
        let board = 8 * STEPS_PER_MM as u32 * SQUARE_SIZE_MM as u32;
        Self {
            // Board plus the graveyard strip beside file a
            x: HomingAxisConfig::for_travel(board + 500),
            y: HomingAxisConfig::for_travel(board),
            z: HomingAxisConfig::for_travel(2000),
        }
    }
}

impl HomingConfig {
    pub fn axis(&self, axis: AxisId) -> &HomingAxisConfig {
        match axis {
            AxisId::X => &self.x,
            AxisId::Y => &self.y,
            AxisId::Z => &self.z,
        }
    }
}

/// Per-motor wiring options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorConfig {
    /// Swap the meaning of the DIR line
    pub direction_inverted: bool,
}

/// Wiring options of every motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorsConfig {
    pub x: MotorConfig,
    pub y1: MotorConfig,
    pub y2: MotorConfig,
    pub z: MotorConfig,
    pub gripper: MotorConfig,
}

impl MotorsConfig {
    pub fn motor(&self, id: MotorId) -> &MotorConfig {
        match id {
            MotorId::X => &self.x,
            MotorId::Y1 => &self.y1,
            MotorId::Y2 => &self.y2,
            MotorId::Z => &self.z,
            MotorId::Gripper => &self.gripper,
        }
    }
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    pub board: BoardGeometry,
    pub heights: ZHeights,
    pub graveyard: GraveyardConfig,
    pub speeds: SpeedConfig,
    pub gripper: GripperConfig,
    pub switches: SwitchConfig,
    pub homing: HomingConfig,
    pub motors: MotorsConfig,
    /// Upper bound on any single executor wait
    pub wait_timeout_ms: u32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            board: BoardGeometry::default(),
            heights: ZHeights::default(),
            graveyard: GraveyardConfig::default(),
            speeds: SpeedConfig::default(),
            gripper: GripperConfig::default(),
            switches: SwitchConfig::default(),
            homing: HomingConfig::default(),
            motors: MotorsConfig::default(),
            wait_timeout_ms: 30_000,
        }
    }
}

impl RobotConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.square_steps <= 0 {
            return Err(ConfigError::InvalidSquareSize);
        }

        let gripper_period = match self.gripper.kind {
            GripperKind::Servo {
                open_angle,
                closed_angle,
                ..
            } => {
                if open_angle > MAX_SERVO_ANGLE || closed_angle > MAX_SERVO_ANGLE {
                    return Err(ConfigError::ServoAngleOutOfRange);
                }
                None
            }
            GripperKind::Stepper { period_us, .. } => Some(period_us),
        };
        if self
            .speeds
            .periods()
            .into_iter()
            .chain(gripper_period)
            .any(|p| p < MIN_STEP_PERIOD_US)
        {
            return Err(ConfigError::StepPeriodTooShort);
        }

        if self.switches.trigger_samples == 0 {
            return Err(ConfigError::InvalidTriggerDebounce);
        }
        if self.switches.release_samples <= self.switches.trigger_samples {
            return Err(ConfigError::ReleaseNotSlowerThanTrigger);
        }

        if AxisId::ALL
            .iter()
            .any(|&axis| self.homing.axis(axis).max_travel_steps == 0)
        {
            return Err(ConfigError::InvalidHomingTravel);
        }

        Ok(())
    }

    /// Decode a postcard-encoded configuration and validate it
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(RobotConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_square_is_1400_steps() {
        assert_eq!(BoardGeometry::default().square_steps, 1400);
    }

    #[test]
    fn test_homing_budget_is_110_percent() {
        let homing = HomingConfig::default();
        assert_eq!(homing.z.max_travel_steps, 2200);
        assert_eq!(homing.z.backoff_steps, 40);
        assert_eq!(homing.z.direction, Direction::Reverse);
    }

    #[test]
    fn test_rejects_zero_square() {
        let mut config = RobotConfig::default();
        config.board.square_steps = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSquareSize));
    }

    #[test]
    fn test_rejects_fast_step_period() {
        let mut config = RobotConfig::default();
        config.speeds.fast_us = 5;
        assert_eq!(config.validate(), Err(ConfigError::StepPeriodTooShort));
    }

    #[test]
    fn test_rejects_symmetric_debounce() {
        let mut config = RobotConfig::default();
        config.switches.release_samples = config.switches.trigger_samples;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReleaseNotSlowerThanTrigger)
        );
    }

    #[test]
    fn test_rejects_servo_angle() {
        let mut config = RobotConfig::default();
        config.gripper.kind = GripperKind::Servo {
            servo: 0,
            open_angle: 200,
            closed_angle: 0,
        };
        assert_eq!(config.validate(), Err(ConfigError::ServoAngleOutOfRange));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_decode_validates() {
        let mut buf = [0u8; 256];
        let config = RobotConfig::default();
        let bytes = postcard::to_slice(&config, &mut buf).unwrap();
        assert_eq!(RobotConfig::from_postcard(bytes), Ok(config));

        let mut broken = config;
        broken.switches.trigger_samples = 0;
        let bytes = postcard::to_slice(&broken, &mut buf).unwrap();
        assert_eq!(
            RobotConfig::from_postcard(bytes),
            Err(ConfigError::InvalidTriggerDebounce)
        );
        assert_eq!(RobotConfig::from_postcard(&[]), Err(ConfigError::Decode));
    }
}
