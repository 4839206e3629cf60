use crate::bits::{Bitboard, Bitvector};
use arrayvec::ArrayVec;
use std::fmt;
use std::sync::Arc;

pub const MAX_SIZE: usize = 64;

/// Number of letters available for pieces and targets.
pub const NUM_SYMBOLS: usize = 26;

/// `X` is the obstacle marker, so it can never name a piece.
pub const MAX_PIECES: usize = NUM_SYMBOLS - 1;

pub const MAX_MOVES: usize = NUM_SYMBOLS * 4;

pub const EMPTY_MARKER: char = '.';
pub const OBSTACLE_MARKER: char = 'X';

/// A grid cell as `(row, col)`.
pub type Position = (u8, u8);

/// Identifies a piece and, through its lowercase counterpart, that piece's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u8);

impl PieceId {
    const OBSTACLE_INDEX: u8 = OBSTACLE_MARKER as u8 - b'A';

    pub fn from_piece_char(ch: char) -> Option<Self> {
        if ch.is_ascii_uppercase() && ch != OBSTACLE_MARKER {
            Some(PieceId(ch as u8 - b'A'))
        } else {
            None
        }
    }

    pub fn from_target_char(ch: char) -> Option<Self> {
        ch.is_ascii_lowercase().then(|| PieceId(ch as u8 - b'a'))
    }

    pub fn piece_char(self) -> char {
        (b'A' + self.0) as char
    }

    pub fn target_char(self) -> char {
        (b'a' + self.0) as char
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every identifier that may name a piece, in ascending order.
    pub fn pieces() -> impl Iterator<Item = PieceId> {
        (0..NUM_SYMBOLS as u8)
            .filter(|&index| index != Self::OBSTACLE_INDEX)
            .map(PieceId)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.piece_char())
    }
}

/// Positions keyed by letter. Iteration is always in identifier order, so two
/// maps holding the same entries are equal and hash identically.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolMap {
    present: Bitvector,
    positions: [Position; NUM_SYMBOLS],
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PieceId) -> Option<Position> {
        self.present
            .contains(id.0)
            .then(|| self.positions[id.index()])
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.present.contains(id.0)
    }

    /// Returns the previous position if `id` was already present.
    pub fn insert(&mut self, id: PieceId, pos: Position) -> Option<Position> {
        let previous = self.get(id);
        self.present.add(id.0);
        self.positions[id.index()] = pos;
        previous
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, Position)> + '_ {
        self.present
            .iter()
            .map(|index| (PieceId(index), self.positions[index as usize]))
    }

    /// The identifier stored at `pos`, if any.
    pub fn at(&self, pos: Position) -> Option<PieceId> {
        self.iter().find(|&(_, p)| p == pos).map(|(id, _)| id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Row and column offsets of a single step.
    fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Case-insensitive inverse of [`Direction::label`].
    pub fn from_label(label: &str) -> Option<Direction> {
        ALL_DIRECTIONS
            .into_iter()
            .find(|dir| dir.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single slide: `piece` travels in `direction` and lands on `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub piece: PieceId,
    pub to: Position,
    pub direction: Direction,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.piece, self.direction)
    }
}

pub type Moves = ArrayVec<Move, MAX_MOVES>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Obstacle,
    Piece(PieceId),
}

/// An immutable puzzle state.
///
/// Cell occupancy is never stored; it is derived from `pieces` and `obstacles`
/// whenever it is needed. Obstacles never change, so every state produced from
/// the same parsed level shares a single copy of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u8,
    height: u8,
    pieces: SymbolMap,
    targets: SymbolMap,
    obstacles: Arc<Bitboard>,
}

impl Board {
    /// Assemble a board from already-validated parts.
    pub(crate) fn from_parts(
        width: u8,
        height: u8,
        pieces: SymbolMap,
        targets: SymbolMap,
        obstacles: Bitboard,
    ) -> Self {
        debug_assert!(width > 0 && height > 0);
        debug_assert!((width as usize) <= MAX_SIZE && (height as usize) <= MAX_SIZE);
        debug_assert!(pieces.iter().all(|(_, pos)| !obstacles.get(pos)));
        Board {
            width,
            height,
            pieces,
            targets,
            obstacles: Arc::new(obstacles),
        }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn pieces(&self) -> &SymbolMap {
        &self.pieces
    }

    pub fn targets(&self) -> &SymbolMap {
        &self.targets
    }

    pub fn obstacles(&self) -> &Bitboard {
        &self.obstacles
    }

    pub fn piece_position(&self, piece: PieceId) -> Option<Position> {
        self.pieces.get(piece)
    }

    pub fn target_position(&self, piece: PieceId) -> Option<Position> {
        self.targets.get(piece)
    }

    /// What currently occupies `pos`.
    pub fn cell(&self, pos: Position) -> Cell {
        if self.obstacles.get(pos) {
            Cell::Obstacle
        } else if let Some(piece) = self.pieces.at(pos) {
            Cell::Piece(piece)
        } else {
            Cell::Empty
        }
    }

    /// Deduplication key for search. Targets and obstacles never change during
    /// a search, so the piece map alone identifies a state.
    pub fn key(&self) -> SymbolMap {
        self.pieces
    }

    /// Every piece stands on its own target. A board without pieces is never solved.
    pub fn is_solved(&self) -> bool {
        if self.pieces.is_empty() {
            return false;
        }
        self.pieces
            .iter()
            .all(|(piece, pos)| self.targets.get(piece) == Some(pos))
    }

    /// Move one cell from `pos` in `dir`.
    /// Returns None if the result would leave the grid.
    fn step(&self, (row, col): Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let new_row = row as i32 + dr as i32;
        let new_col = col as i32 + dc as i32;

        if new_row >= 0
            && new_col >= 0
            && new_row < self.height as i32
            && new_col < self.width as i32
        {
            Some((new_row as u8, new_col as u8))
        } else {
            None
        }
    }

    /// Obstacles plus pieces, rebuilt on every call.
    fn occupancy(&self) -> Bitboard {
        let mut occupied = (*self.obstacles).clone();
        for (_, pos) in self.pieces.iter() {
            occupied.set(pos);
        }
        occupied
    }

    fn slide_from(&self, occupied: &Bitboard, from: Position, dir: Direction) -> Option<Position> {
        let mut pos = from;
        while let Some(next) = self.step(pos, dir) {
            if occupied.get(next) {
                break;
            }
            pos = next;
        }
        (pos != from).then_some(pos)
    }

    /// Landing position of `piece` slid in `dir`, or None if the piece is
    /// absent or cannot move at least one cell.
    pub fn slide(&self, piece: PieceId, dir: Direction) -> Option<Position> {
        let from = self.pieces.get(piece)?;
        self.slide_from(&self.occupancy(), from, dir)
    }

    /// All legal slides, ordered by piece identifier then direction.
    pub fn moves(&self) -> Moves {
        let occupied = self.occupancy();
        let mut moves = Moves::new();
        for (piece, from) in self.pieces.iter() {
            for dir in ALL_DIRECTIONS {
                if let Some(to) = self.slide_from(&occupied, from, dir) {
                    moves.push(Move {
                        piece,
                        to,
                        direction: dir,
                    });
                }
            }
        }
        moves
    }

    /// A new board with `piece` relocated to `to`; everything else is shared or copied.
    /// Panics if `piece` is not on the board.
    pub fn apply(&self, piece: PieceId, to: Position) -> Board {
        assert!(self.pieces.contains(piece), "Invalid piece: {}", piece);
        assert!(
            (to.0 as usize) < self.height() && (to.1 as usize) < self.width(),
            "Destination out of bounds: {:?}",
            to
        );

        let mut pieces = self.pieces;
        pieces.insert(piece, to);
        Board {
            width: self.width,
            height: self.height,
            pieces,
            targets: self.targets,
            obstacles: Arc::clone(&self.obstacles),
        }
    }

    pub fn play(&self, mv: Move) -> Board {
        self.apply(mv.piece, mv.to)
    }
}
