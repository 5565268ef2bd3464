//! Board-agnostic motion core for the chess robot
//!
//! This crate contains all robot logic that does not depend on a
//! specific chip:
//!
//! - Stepper axis driver and the dual-Y pair coordinator
//! - Limit switch debounce and emergency stop
//! - Homing state machine (Z → Y → X)
//! - Chess action planner (square mapping, pickup/place primitives)
//! - Action queue and non-blocking executor
//! - Robot controller tying it together, plus command dispatch
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod motion;
pub mod planner;
pub mod safety;
pub mod scheduler;
pub mod servo;
pub mod state;
pub mod traits;

pub use config::RobotConfig;
pub use controller::{ControllerEvent, Events, MachineParts, RobotController, SwitchSample};
pub use error::RobotError;
pub use planner::PlannerAction;
