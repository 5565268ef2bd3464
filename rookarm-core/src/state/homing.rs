//! Homing states and transitions

use crate::motion::AxisId;

/// Process-wide homing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingState {
    /// No sequence has run since boot
    #[default]
    Idle,
    HomingZ,
    HomingY,
    HomingX,
    /// All three switches captured
    Complete,
    /// A pass could not start or failed; needs a new `home_all`
    Error,
}

/// Inputs to the homing state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingEvent {
    /// `home_all()` requested
    Start,
    /// Current axis captured its switch and stopped
    AxisCaptured,
    /// An axis could not start or overran its travel budget
    Failed,
    /// A standalone axis pass started after an error
    Rearmed,
}

impl HomingState {
    /// Process an event and return the next state
    pub fn transition(self, event: HomingEvent) -> Self {
        use HomingEvent::*;
        use HomingState::*;

        match (self, event) {
            (Idle | Complete | Error, Start) => HomingZ,

            (HomingZ, AxisCaptured) => HomingY,
            (HomingY, AxisCaptured) => HomingX,
            (HomingX, AxisCaptured) => Complete,

            (_, Failed) => Error,
            (Error, Rearmed) => Idle,

            // Start while a sequence runs is rejected by the caller
            _ => self,
        }
    }

    /// Axis being homed in this state
    pub fn axis(self) -> Option<AxisId> {
        match self {
            HomingState::HomingZ => Some(AxisId::Z),
            HomingState::HomingY => Some(AxisId::Y),
            HomingState::HomingX => Some(AxisId::X),
            _ => None,
        }
    }

    pub fn is_homing(self) -> bool {
        self.axis().is_some()
    }

    /// Telemetry name
    pub const fn name(self) -> &'static str {
        match self {
            HomingState::Idle => "idle",
            HomingState::HomingZ => "homing_z",
            HomingState::HomingY => "homing_y",
            HomingState::HomingX => "homing_x",
            HomingState::Complete => "complete",
            HomingState::Error => "error",
        }
    }
}
