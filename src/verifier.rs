use crate::game::Board;
use crate::levels::parse_level;
use crate::solution::{SolutionError, Step, parse_solution};
use std::fmt;

/// Why a claimed solution was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidLevel(String),
    MalformedToken { index: usize, token: String },
    UnknownDirection { index: usize, direction: String },
    UnknownPiece { index: usize, piece: String },
    IllegalMove { index: usize, step: Step },
    NotSolved,
}

impl Rejection {
    /// Short machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InvalidLevel(_) => "invalid-level",
            Rejection::MalformedToken { .. } => "malformed-token",
            Rejection::UnknownDirection { .. } => "unknown-direction",
            Rejection::UnknownPiece { .. } => "unknown-piece",
            Rejection::IllegalMove { .. } => "illegal-move",
            Rejection::NotSolved => "not-won-after-replay",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidLevel(msg) => write!(f, "{}", msg),
            Rejection::MalformedToken { index, token } => {
                write!(f, "move {}: malformed move '{}'", index, token)
            }
            Rejection::UnknownDirection { index, direction } => {
                write!(f, "move {}: unknown direction '{}'", index, direction)
            }
            Rejection::UnknownPiece { index, piece } => {
                write!(f, "move {}: no piece '{}' on the board", index, piece)
            }
            Rejection::IllegalMove { index, step } => {
                write!(f, "move {}: '{}' is not a legal move", index, step)
            }
            Rejection::NotSolved => write!(f, "level is not solved after the last move"),
        }
    }
}

impl std::error::Error for Rejection {}

impl From<SolutionError> for Rejection {
    fn from(err: SolutionError) -> Self {
        match err {
            SolutionError::MalformedToken { index, token } => {
                Rejection::MalformedToken { index, token }
            }
            SolutionError::UnknownDirection { index, direction } => {
                Rejection::UnknownDirection { index, direction }
            }
            SolutionError::UnknownPiece { index, piece } => Rejection::UnknownPiece { index, piece },
        }
    }
}

/// Play `steps` from `start`, recomputing each landing position.
/// Stops at the first step that names a missing piece or an illegal slide.
pub fn replay(start: &Board, steps: &[Step]) -> Result<Board, Rejection> {
    let mut board = start.clone();
    for (i, step) in steps.iter().enumerate() {
        let index = i + 1;
        let Some(from) = board.piece_position(step.piece) else {
            return Err(Rejection::UnknownPiece {
                index,
                piece: step.piece.to_string(),
            });
        };

        let mv = board
            .moves()
            .into_iter()
            .find(|mv| mv.piece == step.piece && mv.direction == step.direction && mv.to != from)
            .ok_or(Rejection::IllegalMove { index, step: *step })?;
        board = board.play(mv);
    }
    Ok(board)
}

/// Check a claimed solution against a level, reporting the first problem.
///
/// A blank solution is accepted only if the level starts out solved.
pub fn check(level: &str, solution: &str) -> Result<(), Rejection> {
    let board = parse_level(level).map_err(|err| Rejection::InvalidLevel(err.to_string()))?;
    let steps = parse_solution(solution)?;
    let end = replay(&board, &steps)?;

    if end.is_solved() {
        Ok(())
    } else {
        Err(Rejection::NotSolved)
    }
}

/// True iff `solution` legally takes `level` to a solved state.
pub fn verify(level: &str, solution: &str) -> bool {
    check(level, solution).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, PieceId};

    fn step(piece: char, direction: Direction) -> Step {
        Step {
            piece: PieceId::from_piece_char(piece).unwrap(),
            direction,
        }
    }

    #[test]
    fn test_already_solved() {
        assert!(verify("Aa", ""));
        assert!(verify("Aa", "   "));
        assert!(verify("Aa", ";;;"));
    }

    #[test]
    fn test_simple_solutions() {
        assert!(verify("A . ; . a", "A down; A right"));
        assert!(verify("A. ;.a", "A right; A down"));
        assert!(verify("A. ;.a", "A dOwN; A rIgHt"));
        assert!(verify("A. ;.a", "A down; ; A right;"));
    }

    #[test]
    fn test_two_pieces() {
        assert!(verify("A.B;.a.b", "A down; B down; A right; B right"));
        assert!(verify(
            "A B . ;X . . ;b a .",
            "B down; B left; A right; A down; A left"
        ));
    }

    #[test]
    fn test_not_solved() {
        assert_eq!(check("A. ;.a", "A down"), Err(Rejection::NotSolved));
        assert_eq!(check("A. ;.a", ";;;"), Err(Rejection::NotSolved));
        assert_eq!(check("A B ; b a", ""), Err(Rejection::NotSolved));
        assert_eq!(check("A B ;b a", "A down; B down"), Err(Rejection::NotSolved));
        assert_eq!(check("a", ""), Err(Rejection::NotSolved));
        assert_eq!(check("A", ""), Err(Rejection::NotSolved));
        // Slides all the way past the column of the target.
        assert_eq!(check("A.. ; ..a", "A right"), Err(Rejection::NotSolved));
    }

    #[test]
    fn test_illegal_moves() {
        assert_eq!(
            check("A X ; . a", "A right"),
            Err(Rejection::IllegalMove {
                index: 1,
                step: step('A', Direction::Right),
            })
        );
        assert_eq!(
            check("A B ;. a", "A right"),
            Err(Rejection::IllegalMove {
                index: 1,
                step: step('A', Direction::Right),
            })
        );
        assert_eq!(
            check("A B . ;X . . ;b a .", "B down; A down; B right; A right; B up"),
            Err(Rejection::IllegalMove {
                index: 2,
                step: step('A', Direction::Down),
            })
        );
    }

    #[test]
    fn test_single_change_breaks_solution() {
        let level = "A . ;. a";
        assert!(verify(level, "A down; A right"));
        assert!(!verify(level, "A down; A left"));
        assert!(!verify(level, "A up; A right"));
        assert!(!verify(level, "A down; A right; A right"));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(
            check("A. ;.a", "C down"),
            Err(Rejection::UnknownPiece {
                index: 1,
                piece: "C".to_string(),
            })
        );
        assert_eq!(
            check("A. ;.a", "A diagonal").map_err(|r| r.code()),
            Err("unknown-direction")
        );
        assert_eq!(
            check("A. ;.a", "A up down").map_err(|r| r.code()),
            Err("malformed-token")
        );
        assert_eq!(check("", "").map_err(|r| r.code()), Err("invalid-level"));
        assert_eq!(check("A ? a", "A right").map_err(|r| r.code()), Err("invalid-level"));
    }

    #[test]
    fn test_replay_returns_final_board() {
        let board = parse_level("A . ;. a").unwrap();
        let end = replay(
            &board,
            &[step('A', Direction::Right), step('A', Direction::Down)],
        )
        .unwrap();
        assert!(end.is_solved());
        assert_eq!(end.targets(), board.targets());
        assert!(replay(&board, &[]).unwrap() == board);
    }
}
