//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use rookarm_protocol::{Command, Outbound, SquareText};

/// Channel capacity for decoded host commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for replies and events bound for the host
const OUTBOUND_CHANNEL_SIZE: usize = 16;

/// Channel capacity for scanner move reports
const MOVE_CHANNEL_SIZE: usize = 4;

/// Commands decoded from the host UART
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Replies and telemetry waiting for the host UART
pub static OUTBOUND_CHANNEL: Channel<CriticalSectionRawMutex, Outbound, OUTBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Moves reported by the board scanner as (from, to) square names
pub static MOVE_DETECTED: Channel<
    CriticalSectionRawMutex,
    (SquareText, SquareText),
    MOVE_CHANNEL_SIZE,
> = Channel::new();
