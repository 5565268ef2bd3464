//! High-level chess actions

use heapless::Vec;
use rookarm_protocol::ActionRequest;

use super::primitive::Primitive;
use super::square::ChessSquare;
use crate::error::RobotError;

/// Longest primitive sequence of any action
pub const MAX_PRIMITIVES: usize = 4;

/// One already-validated chess event to carry out physically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlannerAction {
    Move {
        from: ChessSquare,
        to: ChessSquare,
    },
    Capture {
        from: ChessSquare,
        to: ChessSquare,
    },
    /// `captured` is the square of the pawn taken en passant
    EnPassant {
        from: ChessSquare,
        to: ChessSquare,
        captured: ChessSquare,
    },
    /// The rook moves first so the king's path is clear
    Castle {
        rook_from: ChessSquare,
        rook_to: ChessSquare,
        king_from: ChessSquare,
        king_to: ChessSquare,
    },
    /// Take a piece off the board
    Remove {
        from: ChessSquare,
    },
}

impl PlannerAction {
    /// Ordered pickup/place sequence for this action
    pub fn primitives(&self) -> Vec<Primitive, MAX_PRIMITIVES> {
        use Primitive::*;

        let sequence: &[Primitive] = match *self {
            PlannerAction::Move { from, to } => &[Pickup(from), Place(to)],
            PlannerAction::Capture { from, to } => {
                &[Pickup(to), PlaceAtGraveyard, Pickup(from), Place(to)]
            }
            PlannerAction::EnPassant { from, to, captured } => {
                &[Pickup(captured), PlaceAtGraveyard, Pickup(from), Place(to)]
            }
            PlannerAction::Castle {
                rook_from,
                rook_to,
                king_from,
                king_to,
            } => &[
                Pickup(rook_from),
                Place(rook_to),
                Pickup(king_from),
                Place(king_to),
            ],
            PlannerAction::Remove { from } => &[Pickup(from), PlaceAtGraveyard],
        };

        // Every sequence above is at most MAX_PRIMITIVES long
        Vec::from_slice(sequence).unwrap_or_default()
    }

    pub const fn name(&self) -> &'static str {
        match self {
            PlannerAction::Move { .. } => "move",
            PlannerAction::Capture { .. } => "capture",
            PlannerAction::EnPassant { .. } => "en_passant",
            PlannerAction::Castle { .. } => "castle",
            PlannerAction::Remove { .. } => "remove",
        }
    }
}

impl TryFrom<&ActionRequest> for PlannerAction {
    type Error = RobotError;

    fn try_from(request: &ActionRequest) -> Result<Self, Self::Error> {
        let sq = |text: &str| ChessSquare::parse(text);
        Ok(match request {
            ActionRequest::Move { from, to } => PlannerAction::Move {
                from: sq(from)?,
                to: sq(to)?,
            },
            ActionRequest::Capture { from, to } => PlannerAction::Capture {
                from: sq(from)?,
                to: sq(to)?,
            },
            ActionRequest::EnPassant { from, to, captured } => PlannerAction::EnPassant {
                from: sq(from)?,
                to: sq(to)?,
                captured: sq(captured)?,
            },
            ActionRequest::Castle {
                rook_from,
                rook_to,
                king_from,
                king_to,
            } => PlannerAction::Castle {
                rook_from: sq(rook_from)?,
                rook_to: sq(rook_to)?,
                king_from: sq(king_from)?,
                king_to: sq(king_to)?,
            },
            ActionRequest::Remove { from } => PlannerAction::Remove { from: sq(from)? },
        })
    }
}

impl From<&PlannerAction> for ActionRequest {
    fn from(action: &PlannerAction) -> Self {
        match *action {
            PlannerAction::Move { from, to } => ActionRequest::Move {
                from: from.to_text(),
                to: to.to_text(),
            },
            PlannerAction::Capture { from, to } => ActionRequest::Capture {
                from: from.to_text(),
                to: to.to_text(),
            },
            PlannerAction::EnPassant { from, to, captured } => ActionRequest::EnPassant {
                from: from.to_text(),
                to: to.to_text(),
                captured: captured.to_text(),
            },
            PlannerAction::Castle {
                rook_from,
                rook_to,
                king_from,
                king_to,
            } => ActionRequest::Castle {
                rook_from: rook_from.to_text(),
                rook_to: rook_to.to_text(),
                king_from: king_from.to_text(),
                king_to: king_to.to_text(),
            },
            PlannerAction::Remove { from } => ActionRequest::Remove {
                from: from.to_text(),
            },
        }
    }
}
