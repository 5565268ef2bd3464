//! Pickup and place primitives
//!
//! A primitive expands into a fixed list of [`MotionStep`]s. Command
//! steps (`Move*`, `Gripper*`) are issued back to back; wait steps hold
//! the executor until the machine reports the motion reached.

use heapless::Vec;

use super::square::ChessSquare;
use crate::config::RobotConfig;

/// Longest step list of any primitive (pickup)
pub const MAX_STEPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Primitive {
    /// Lift the piece standing on a square
    Pickup(ChessSquare),
    /// Put the held piece down on a square
    Place(ChessSquare),
    /// Put the held piece down off the board
    PlaceAtGraveyard,
}

/// One executor step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionStep {
    MoveXy { x: i32, y: i32, period_us: u32 },
    WaitXy { x: i32, y: i32 },
    MoveZ { z: i32, period_us: u32 },
    WaitZ { z: i32 },
    GripperOpen,
    GripperClose,
    /// Let the jaws finish moving before the next step
    SettleGripper { ms: u32 },
}

impl MotionStep {
    /// Steps that hold the executor until a condition is met
    pub fn is_wait(&self) -> bool {
        matches!(
            self,
            MotionStep::WaitXy { .. } | MotionStep::WaitZ { .. } | MotionStep::SettleGripper { .. }
        )
    }
}

impl Primitive {
    /// Expand into executor steps for the given machine configuration
    pub fn steps(&self, config: &RobotConfig) -> Vec<MotionStep, MAX_STEPS> {
        let travel = config.heights.travel;
        let xy_period = config.speeds.travel_us;
        let z_period = config.speeds.z_us;
        let open_ms = config.gripper.open_delay_ms;
        let close_ms = config.gripper.close_delay_ms;

        let (x, y) = match *self {
            Primitive::Pickup(square) | Primitive::Place(square) => square.to_steps(&config.board),
            Primitive::PlaceAtGraveyard => (config.graveyard.x, config.graveyard.y),
        };

        let sequence: &[MotionStep] = match self {
            // Descend and open are issued together
            Primitive::Pickup(_) => &[
                MotionStep::MoveXy { x, y, period_us: xy_period },
                MotionStep::WaitXy { x, y },
                MotionStep::MoveZ { z: config.heights.pick, period_us: z_period },
                MotionStep::GripperOpen,
                MotionStep::WaitZ { z: config.heights.pick },
                MotionStep::SettleGripper { ms: open_ms },
                MotionStep::GripperClose,
                MotionStep::SettleGripper { ms: close_ms },
                MotionStep::MoveZ { z: travel, period_us: z_period },
                MotionStep::WaitZ { z: travel },
            ],
            Primitive::Place(_) | Primitive::PlaceAtGraveyard => &[
                MotionStep::MoveXy { x, y, period_us: xy_period },
                MotionStep::WaitXy { x, y },
                MotionStep::MoveZ { z: config.heights.place, period_us: z_period },
                MotionStep::WaitZ { z: config.heights.place },
                MotionStep::GripperOpen,
                MotionStep::SettleGripper { ms: open_ms },
                MotionStep::MoveZ { z: travel, period_us: z_period },
                MotionStep::WaitZ { z: travel },
            ],
        };

        Vec::from_slice(sequence).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_opens_while_descending() {
        let config = RobotConfig::default();
        let steps = Primitive::Pickup(ChessSquare::parse("b3").unwrap()).steps(&config);

        assert_eq!(steps.len(), 10);
        assert_eq!(
            steps[0],
            MotionStep::MoveXy { x: 1400, y: 2800, period_us: config.speeds.travel_us }
        );
        assert!(matches!(steps[2], MotionStep::MoveZ { z: 2000, .. }));
        // No wait between the descend and the open
        assert_eq!(steps[3], MotionStep::GripperOpen);
        assert_eq!(steps[4], MotionStep::WaitZ { z: 2000 });
        assert_eq!(steps[6], MotionStep::GripperClose);
        assert_eq!(steps[9], MotionStep::WaitZ { z: config.heights.travel });
    }

    #[test]
    fn test_place_waits_for_z_before_release() {
        let config = RobotConfig::default();
        let steps = Primitive::Place(ChessSquare::parse("a1").unwrap()).steps(&config);

        assert_eq!(steps.len(), 8);
        assert_eq!(steps[3], MotionStep::WaitZ { z: config.heights.place });
        assert_eq!(steps[4], MotionStep::GripperOpen);
        assert!(!steps.contains(&MotionStep::GripperClose));
    }

    #[test]
    fn test_graveyard_uses_fixed_coordinate() {
        let config = RobotConfig::default();
        let steps = Primitive::PlaceAtGraveyard.steps(&config);

        assert_eq!(
            steps[1],
            MotionStep::WaitXy { x: config.graveyard.x, y: config.graveyard.y }
        );
    }

    #[test]
    fn test_every_sequence_fits() {
        let config = RobotConfig::default();
        let square = ChessSquare::parse("h8").unwrap();
        for primitive in [
            Primitive::Pickup(square),
            Primitive::Place(square),
            Primitive::PlaceAtGraveyard,
        ] {
            assert!(!primitive.steps(&config).is_empty());
        }
    }
}
