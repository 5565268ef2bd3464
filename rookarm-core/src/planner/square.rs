//! Chess square coordinates

use core::fmt::{self, Write};

use rookarm_protocol::SquareText;

use crate::config::BoardGeometry;
use crate::error::RobotError;

/// Board square, file and rank both 0-7 (`a1` is `{0, 0}`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChessSquare {
    file: u8,
    rank: u8,
}

impl ChessSquare {
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub const fn file(self) -> u8 {
        self.file
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Parse algebraic notation: file `a`-`h` (any case) then rank `1`-`8`
    pub fn parse(text: &str) -> Result<Self, RobotError> {
        match text.trim().as_bytes() {
            &[file, rank] => {
                let file = file.to_ascii_lowercase();
                if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
                    return Err(RobotError::InvalidArgument);
                }
                Ok(Self {
                    file: file - b'a',
                    rank: rank - b'1',
                })
            }
            _ => Err(RobotError::InvalidArgument),
        }
    }

    /// Gantry coordinates of the square centre
    pub fn to_steps(self, board: &BoardGeometry) -> (i32, i32) {
        (
            board.origin_x + self.file as i32 * board.square_steps,
            board.origin_y + self.rank as i32 * board.square_steps,
        )
    }

    pub fn to_text(self) -> SquareText {
        let mut text = SquareText::new();
        // Two characters always fit
        let _ = write!(text, "{}", self);
        text
    }
}

impl fmt::Display for ChessSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + self.file) as char)?;
        f.write_char((b'1' + self.rank) as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_e4() {
        let sq = ChessSquare::parse("e4").unwrap();
        assert_eq!((sq.file(), sq.rank()), (4, 3));
        assert_eq!(sq.to_text().as_str(), "e4");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ChessSquare::parse("H8"), ChessSquare::parse("h8"));
        assert_eq!(ChessSquare::parse("A1").unwrap(), ChessSquare::new(0, 0).unwrap());
    }

    #[test]
    fn test_rejects_malformed() {
        for text in ["i9", "a0", "", "e", "e44", "4e", "a9", "z1"] {
            assert_eq!(ChessSquare::parse(text), Err(RobotError::InvalidArgument), "{text}");
        }
    }

    #[test]
    fn test_new_bounds() {
        assert!(ChessSquare::new(7, 7).is_some());
        assert!(ChessSquare::new(8, 0).is_none());
        assert!(ChessSquare::new(0, 8).is_none());
    }

    #[test]
    fn test_to_steps() {
        let board = BoardGeometry {
            origin_x: 100,
            origin_y: -50,
            square_steps: 1400,
        };
        let sq = ChessSquare::parse("c2").unwrap();
        assert_eq!(sq.to_steps(&board), (100 + 2 * 1400, -50 + 1400));
    }

    proptest! {
        #[test]
        fn prop_text_round_trip(file in 0u8..8, rank in 0u8..8) {
            let sq = ChessSquare::new(file, rank).unwrap();
            prop_assert_eq!(ChessSquare::parse(sq.to_text().as_str()), Ok(sq));
        }
    }
}
