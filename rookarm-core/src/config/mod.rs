//! Configuration types
//!
//! [`RobotConfig`] carries every tunable of the machine. Defaults match
//! the reference build (20 steps/mm, 70 mm squares). The firmware loads a
//! build-time `machine.toml` through the `serde` feature.

pub mod robot;

pub use robot::{
    BoardGeometry, ConfigError, GraveyardConfig, GripperConfig, GripperKind, HomingAxisConfig,
    HomingConfig, MotorConfig, MotorsConfig, RobotConfig, SpeedConfig, SwitchConfig, ZHeights,
    MAX_SERVO_ANGLE, MIN_STEP_PERIOD_US,
};
