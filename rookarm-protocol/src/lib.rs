//! Command and telemetry protocol for the chess robot
//!
//! This crate defines the messages exchanged between the robot firmware
//! and the host that drives it (game software, diagnostics console).
//! Commands flow host → robot; replies and asynchronous events flow
//! robot → host.
//!
//! # Wire Format
//!
//! Every message travels in one frame:
//! ```text
//! ┌───────┬────────┬──────┬──────────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD          │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ postcard, ≤240B  │ 1B       │
//! └───────┴────────┴──────┴──────────────────┴──────────┘
//! ```
//!
//! The payload is the `postcard` encoding of a [`Command`], [`Response`]
//! or [`Event`], selected by the TYPE byte.
//!
//! Squares and motor names travel as short text (`"e4"`, `"y2"`) and are
//! validated by the robot, so a malformed argument comes back as
//! [`ErrorCode::InvalidArgument`] instead of failing to decode.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod message;
pub mod report;

pub use command::{ActionRequest, Command, HomingCommand, Name, SquareText, StepperCommand};
pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use message::{ErrorCode, Event, Outbound, Response};
pub use report::{AxisReport, HomingReport, Position, StatusReport, StepperReport, SwitchReport};
