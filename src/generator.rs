use crate::game::{MAX_PIECES, MAX_SIZE, Move, OBSTACLE_MARKER, PieceId, Position};
use crate::levels::{ROW_DELIMITER, Token, parse_level};
use crate::solution::format_solution;
use crate::solver::{SolveResult, Solver};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Parameters for random level generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub num_pieces: usize,
    pub num_obstacles: usize,
    /// Candidate levels to try before giving up.
    pub max_attempts: usize,
    /// Longest solution the solver will look for.
    pub max_depth: usize,
    /// Reject candidates that are already solved.
    pub require_non_trivial: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            width: 5,
            height: 5,
            num_pieces: 3,
            num_obstacles: 5,
            max_attempts: 100,
            max_depth: 25,
            require_non_trivial: true,
        }
    }
}

/// The parameters cannot describe any level. Not to be confused with a
/// generator that simply found nothing solvable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDimensions { width: usize, height: usize },
    TooManyPieces { requested: usize, max: usize },
    InsufficientSpace { required: usize, available: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDimensions { width, height } => write!(
                f,
                "grid {}x{} must be between 1x1 and {}x{}",
                width, height, MAX_SIZE, MAX_SIZE
            ),
            ConfigError::TooManyPieces { requested, max } => {
                write!(
                    f,
                    "{} pieces requested, at most {} allowed ('{}' marks obstacles)",
                    requested, max, OBSTACLE_MARKER
                )
            }
            ConfigError::InsufficientSpace {
                required,
                available,
            } => write!(
                f,
                "pieces, targets and obstacles need {} cells but the grid has {}",
                required, available
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.width > MAX_SIZE || self.height > MAX_SIZE {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.num_pieces > MAX_PIECES {
            return Err(ConfigError::TooManyPieces {
                requested: self.num_pieces,
                max: MAX_PIECES,
            });
        }
        Ok(())
    }

    fn check_capacity(&self) -> Result<(), ConfigError> {
        let required = self
            .num_obstacles
            .saturating_add(2 * self.num_pieces);
        let available = self.width * self.height;
        if required > available {
            return Err(ConfigError::InsufficientSpace {
                required,
                available,
            });
        }
        Ok(())
    }
}

/// A solvable level together with a shortest solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLevel {
    pub level: String,
    pub solution: String,
    pub moves: Vec<Move>,
}

/// Random level generator: place everything at random, keep the first
/// candidate the solver can finish.
pub struct Generator<R> {
    config: GeneratorConfig,
    rng: R,
    attempts: usize,
}

impl Generator<ChaCha8Rng> {
    /// A generator whose output is fully determined by `seed`.
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Generator<R> {
    pub fn new(config: GeneratorConfig, rng: R) -> Self {
        Generator {
            config,
            rng,
            attempts: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Attempts used by the last call to [`Generator::generate`].
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Returns `Ok(None)` when no solvable level turned up within the
    /// configured number of attempts.
    pub fn generate(&mut self) -> Result<Option<GeneratedLevel>, ConfigError> {
        self.attempts = 0;
        self.config.validate()?;

        if self.config.num_pieces == 0 {
            let level = layout_level(self.config.width, self.config.height, &[], &[]);
            return Ok(Some(GeneratedLevel {
                level,
                solution: String::new(),
                moves: Vec::new(),
            }));
        }

        self.config.check_capacity()?;

        for attempt in 1..=self.config.max_attempts {
            self.attempts = attempt;
            if let Some(generated) = self.attempt(attempt) {
                info!(
                    "generated a {}-move level on attempt {}",
                    generated.moves.len(),
                    attempt
                );
                return Ok(Some(generated));
            }
        }

        debug!(
            "no solvable level after {} attempts",
            self.config.max_attempts
        );
        Ok(None)
    }

    fn attempt(&mut self, attempt: usize) -> Option<GeneratedLevel> {
        let config = self.config;

        let mut coords: Vec<Position> = (0..config.height)
            .flat_map(|row| (0..config.width).map(move |col| (row as u8, col as u8)))
            .collect();
        coords.shuffle(&mut self.rng);

        let mut placements = Vec::with_capacity(config.num_pieces);
        for piece in PieceId::pieces().take(config.num_pieces) {
            let (Some(piece_pos), Some(target_pos)) = (coords.pop(), coords.pop()) else {
                break;
            };
            placements.push((piece, piece_pos, target_pos));
        }
        if placements.len() != config.num_pieces {
            debug!("attempt {}: no room for every piece and target", attempt);
            return None;
        }

        let obstacles: Vec<Position> = (0..config.num_obstacles)
            .map_while(|_| coords.pop())
            .collect();

        let level = layout_level(config.width, config.height, &placements, &obstacles);
        let board = match parse_level(&level) {
            Ok(board) => board,
            Err(err) => {
                debug!("attempt {}: {}", attempt, err);
                return None;
            }
        };

        // Pieces and targets are drawn from distinct cells, so this only
        // fires if placement ever allows a piece to start on its target.
        if config.require_non_trivial && Solver::new(0).solve(&board).is_solved() {
            debug!("attempt {}: already solved", attempt);
            return None;
        }

        let mut solver = Solver::new(config.max_depth);
        match solver.solve(&board) {
            SolveResult::Solved(moves) => Some(GeneratedLevel {
                level,
                solution: format_solution(&moves),
                moves,
            }),
            result => {
                debug!(
                    "attempt {}: {:?} after expanding {} states",
                    attempt,
                    result,
                    solver.nodes_explored()
                );
                None
            }
        }
    }
}

/// Render placements in the level text format.
///
/// A target that shares a cell with its own piece is written as a combined
/// token; one that lands on any other occupied cell is dropped.
fn layout_level(
    width: usize,
    height: usize,
    placements: &[(PieceId, Position, Position)],
    obstacles: &[Position],
) -> String {
    let mut grid = vec![vec![Token::Empty; width]; height];

    for &(row, col) in obstacles {
        grid[row as usize][col as usize] = Token::Obstacle;
    }
    for &(piece, (row, col), target_pos) in placements {
        grid[row as usize][col as usize] = if target_pos == (row, col) {
            Token::Combined {
                piece,
                target: piece,
            }
        } else {
            Token::Piece(piece)
        };
    }
    for &(piece, _, (row, col)) in placements {
        let slot = &mut grid[row as usize][col as usize];
        if *slot == Token::Empty {
            *slot = Token::Target(piece);
        }
    }

    grid.iter()
        .map(|row| {
            row.iter()
                .map(Token::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(&ROW_DELIMITER.to_string())
}
