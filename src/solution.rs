use crate::game::{Direction, Move, PieceId};
use std::fmt;

pub const MOVE_DELIMITER: char = ';';

/// One move of a solution as written down: which piece, which way.
/// The landing position is recomputed by replaying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub piece: PieceId,
    pub direction: Direction,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.piece, self.direction)
    }
}

impl From<Move> for Step {
    fn from(mv: Move) -> Self {
        Step {
            piece: mv.piece,
            direction: mv.direction,
        }
    }
}

/// Error type for solution text. `index` is the 1-based position of the
/// offending move, not counting blank fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionError {
    MalformedToken { index: usize, token: String },
    UnknownDirection { index: usize, direction: String },
    UnknownPiece { index: usize, piece: String },
}

impl fmt::Display for SolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionError::MalformedToken { index, token } => {
                write!(f, "move {}: expected '<piece> <direction>', got '{}'", index, token)
            }
            SolutionError::UnknownDirection { index, direction } => {
                write!(f, "move {}: unknown direction '{}'", index, direction)
            }
            SolutionError::UnknownPiece { index, piece } => {
                write!(f, "move {}: '{}' is not a piece", index, piece)
            }
        }
    }
}

impl std::error::Error for SolutionError {}

/// Parse `"A down; B right"`. Blank fragments between delimiters are ignored,
/// directions are case-insensitive.
pub fn parse_solution(text: &str) -> Result<Vec<Step>, SolutionError> {
    text.split(MOVE_DELIMITER)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .enumerate()
        .map(|(i, fragment)| parse_step(i + 1, fragment))
        .collect()
}

fn parse_step(index: usize, fragment: &str) -> Result<Step, SolutionError> {
    let parts: Vec<&str> = fragment.split_whitespace().collect();
    let [piece, direction] = parts.as_slice() else {
        return Err(SolutionError::MalformedToken {
            index,
            token: fragment.to_string(),
        });
    };

    let direction =
        Direction::from_label(direction).ok_or_else(|| SolutionError::UnknownDirection {
            index,
            direction: direction.to_string(),
        })?;

    let mut chars = piece.chars();
    let piece_id = match (chars.next(), chars.next()) {
        (Some(ch), None) => PieceId::from_piece_char(ch),
        _ => None,
    };
    let piece = piece_id.ok_or_else(|| SolutionError::UnknownPiece {
        index,
        piece: piece.to_string(),
    })?;

    Ok(Step { piece, direction })
}

/// Serialize moves as `"A down;B right"`.
pub fn format_solution(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|mv| mv.to_string())
        .collect::<Vec<_>>()
        .join(&MOVE_DELIMITER.to_string())
}
