//! Kuboble Puzzle Engine
//!
//! Parses and writes sliding-block levels, generates the legal slides of a
//! position, finds shortest solutions by breadth-first search, generates new
//! solvable levels and checks claimed solutions.

pub mod bits;
pub mod game;
pub mod generator;
pub mod levels;
pub mod solution;
pub mod solver;
pub mod verifier;

pub use game::{Board, Direction, Move, PieceId, Position};
pub use generator::{ConfigError, GeneratedLevel, Generator, GeneratorConfig};
pub use levels::{LevelError, Levels, format_level, parse_level};
pub use solution::{Step, format_solution, parse_solution};
pub use solver::{SolveResult, Solver};
pub use verifier::{Rejection, check, verify};
