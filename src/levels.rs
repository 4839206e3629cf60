use crate::bits::Bitboard;
use crate::game::{Board, Cell, EMPTY_MARKER, MAX_SIZE, OBSTACLE_MARKER, PieceId, SymbolMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

pub const ROW_DELIMITER: char = ';';

/// Error type for level parsing operations.
#[derive(Debug)]
pub enum LevelError {
    /// IO error when reading from file
    Io(io::Error),
    /// No row contains a single cell
    Empty,
    /// Grid exceeds the supported dimensions
    TooLarge { width: usize, height: usize },
    /// A cell token that is not a recognized combination of symbols
    InvalidToken {
        row: usize,
        column: usize,
        token: String,
    },
    /// The same piece appears in more than one cell
    DuplicatePiece { piece: char, row: usize, column: usize },
    /// The same target appears in more than one cell
    DuplicateTarget { target: char, row: usize, column: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(err) => write!(f, "IO error: {}", err),
            LevelError::Empty => write!(f, "Invalid level: no cells"),
            LevelError::TooLarge { width, height } => write!(
                f,
                "Invalid level: {}x{} exceeds maximum size {}x{}",
                width, height, MAX_SIZE, MAX_SIZE
            ),
            LevelError::InvalidToken { row, column, token } => write!(
                f,
                "Invalid level: unrecognized token '{}' at row {}, column {}",
                token, row, column
            ),
            LevelError::DuplicatePiece { piece, row, column } => write!(
                f,
                "Invalid level: piece '{}' repeated at row {}, column {}",
                piece, row, column
            ),
            LevelError::DuplicateTarget {
                target,
                row,
                column,
            } => write!(
                f,
                "Invalid level: target '{}' repeated at row {}, column {}",
                target, row, column
            ),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LevelError {
    fn from(err: io::Error) -> Self {
        LevelError::Io(err)
    }
}

/// Contents of a single cell in the level text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Empty,
    Obstacle,
    Piece(PieceId),
    Target(PieceId),
    /// A piece standing on a target, not necessarily its own.
    Combined { piece: PieceId, target: PieceId },
}

impl Token {
    /// Classify a cell token. Returns None for anything unrecognized.
    pub fn parse(text: &str) -> Option<Token> {
        if text.len() == 1 {
            match text.chars().next()? {
                EMPTY_MARKER => return Some(Token::Empty),
                OBSTACLE_MARKER => return Some(Token::Obstacle),
                _ => {}
            }
        }

        let mut piece = None;
        let mut target = None;
        for ch in text.chars() {
            if let Some(id) = PieceId::from_piece_char(ch) {
                if piece.replace(id).is_some() {
                    return None;
                }
            } else if let Some(id) = PieceId::from_target_char(ch) {
                if target.replace(id).is_some() {
                    return None;
                }
            } else {
                return None;
            }
        }

        match (piece, target) {
            (Some(piece), Some(target)) => Some(Token::Combined { piece, target }),
            (Some(piece), None) => Some(Token::Piece(piece)),
            (None, Some(target)) => Some(Token::Target(target)),
            (None, None) => None,
        }
    }

    fn from_cell(cell: Cell, target: Option<PieceId>) -> Token {
        match (cell, target) {
            (Cell::Obstacle, _) => Token::Obstacle,
            (Cell::Piece(piece), Some(target)) => Token::Combined { piece, target },
            (Cell::Piece(piece), None) => Token::Piece(piece),
            (Cell::Empty, Some(target)) => Token::Target(target),
            (Cell::Empty, None) => Token::Empty,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Empty => write!(f, "{}", EMPTY_MARKER),
            Token::Obstacle => write!(f, "{}", OBSTACLE_MARKER),
            Token::Piece(piece) => write!(f, "{}", piece.piece_char()),
            Token::Target(target) => write!(f, "{}", target.target_char()),
            Token::Combined { piece, target } => {
                write!(f, "{}{}", piece.piece_char(), target.target_char())
            }
        }
    }
}

/// Split a row into cell tokens.
///
/// Whitespace-separated tokens take precedence; otherwise a row containing
/// the empty marker has one cell per character; otherwise the whole row is a
/// single cell (which allows `Aa` for a piece on its target).
fn row_tokens(row: &str) -> Vec<&str> {
    let row = row.trim();
    if row.is_empty() {
        Vec::new()
    } else if row.contains(char::is_whitespace) {
        row.split_whitespace().collect()
    } else if row.contains(EMPTY_MARKER) {
        row.char_indices()
            .map(|(i, ch)| &row[i..i + ch.len_utf8()])
            .collect()
    } else {
        vec![row]
    }
}

/// Parse a level from its single-line text form, e.g. `"A . ;. a"`.
///
/// Rows are separated by `;`. Rows shorter than the widest row are padded
/// with empty cells.
pub fn parse_level(text: &str) -> Result<Board, LevelError> {
    let rows: Vec<Vec<&str>> = text.trim().split(ROW_DELIMITER).map(row_tokens).collect();

    let height = rows.len();
    let width = rows.iter().map(|tokens| tokens.len()).max().unwrap_or(0);

    if width == 0 {
        return Err(LevelError::Empty);
    }
    if width > MAX_SIZE || height > MAX_SIZE {
        return Err(LevelError::TooLarge { width, height });
    }

    let mut pieces = SymbolMap::new();
    let mut targets = SymbolMap::new();
    let mut obstacles = Bitboard::new();

    for (row, tokens) in rows.iter().enumerate() {
        for (column, text) in tokens.iter().enumerate() {
            let token = Token::parse(text).ok_or_else(|| LevelError::InvalidToken {
                row,
                column,
                token: text.to_string(),
            })?;
            let pos = (row as u8, column as u8);

            let (piece, target) = match token {
                Token::Empty => (None, None),
                Token::Obstacle => {
                    obstacles.set(pos);
                    (None, None)
                }
                Token::Piece(piece) => (Some(piece), None),
                Token::Target(target) => (None, Some(target)),
                Token::Combined { piece, target } => (Some(piece), Some(target)),
            };

            if let Some(piece) = piece {
                if pieces.insert(piece, pos).is_some() {
                    return Err(LevelError::DuplicatePiece {
                        piece: piece.piece_char(),
                        row,
                        column,
                    });
                }
            }
            if let Some(target) = target {
                if targets.insert(target, pos).is_some() {
                    return Err(LevelError::DuplicateTarget {
                        target: target.target_char(),
                        row,
                        column,
                    });
                }
            }
        }
    }

    Ok(Board::from_parts(
        width as u8,
        height as u8,
        pieces,
        targets,
        obstacles,
    ))
}

/// Serialize a board into the text form accepted by [`parse_level`].
pub fn format_level(board: &Board) -> String {
    board.to_string()
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height() {
            if row > 0 {
                write!(f, "{}", ROW_DELIMITER)?;
            }
            for column in 0..self.width() {
                if column > 0 {
                    write!(f, " ")?;
                }
                let pos = (row as u8, column as u8);
                let token = Token::from_cell(self.cell(pos), self.targets().at(pos));
                write!(f, "{}", token)?;
            }
        }
        Ok(())
    }
}

/// A collection of levels, one per line.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Board>,
}

impl Levels {
    /// Parse levels from a string.
    ///
    /// Each non-empty line holds one level in the single-line form. Lines
    /// starting with `#` are comments.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let levels = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(parse_level)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Levels { levels })
    }

    /// Parse levels from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Board> {
        self.levels.get(index)
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(ch: char) -> PieceId {
        PieceId::from_piece_char(ch.to_ascii_uppercase()).unwrap()
    }

    #[test]
    fn test_token_kinds() {
        assert_eq!(Token::parse("."), Some(Token::Empty));
        assert_eq!(Token::parse("X"), Some(Token::Obstacle));
        assert_eq!(Token::parse("A"), Some(Token::Piece(id('A'))));
        assert_eq!(Token::parse("b"), Some(Token::Target(id('b'))));
        let combined = Token::Combined {
            piece: id('A'),
            target: id('a'),
        };
        assert_eq!(Token::parse("Aa"), Some(combined));
        assert_eq!(Token::parse("aA"), Some(combined));
        assert_eq!(
            Token::parse("Cb"),
            Some(Token::Combined {
                piece: id('C'),
                target: id('b'),
            })
        );
    }

    #[test]
    fn test_token_rejects_garbage() {
        for text in ["", "AB", "ab", "A.", "XX", "Xa", "#", "1", "AaB", "É"] {
            assert_eq!(Token::parse(text), None, "token {:?}", text);
        }
    }

    #[test]
    fn test_parse_space_separated() {
        let board = parse_level("A . ;. a").unwrap();
        assert_eq!(board.width(), 2);
        assert_eq!(board.height(), 2);
        assert_eq!(board.piece_position(id('A')), Some((0, 0)));
        assert_eq!(board.target_position(id('A')), Some((1, 1)));
        assert_eq!(board.obstacles().len(), 0);
    }

    #[test]
    fn test_parse_dot_rows() {
        let board = parse_level("A.B;.a.b").unwrap();
        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 2);
        assert_eq!(board.piece_position(id('B')), Some((0, 2)));
        assert_eq!(board.target_position(id('B')), Some((1, 3)));
        assert_eq!(board.cell((0, 3)), Cell::Empty);
    }

    #[test]
    fn test_parse_combined_row() {
        let board = parse_level("Aa").unwrap();
        assert_eq!(board.width(), 1);
        assert_eq!(board.height(), 1);
        assert_eq!(board.piece_position(id('A')), Some((0, 0)));
        assert_eq!(board.target_position(id('A')), Some((0, 0)));
        assert!(board.is_solved());
    }

    #[test]
    fn test_parse_mixed_rows() {
        // "AX" has no space and no dot, so it is one (invalid) token.
        assert!(matches!(
            parse_level("AX ;.a"),
            Err(LevelError::InvalidToken { row: 0, column: 0, .. })
        ));
        // Short rows are padded with empty cells.
        let board = parse_level("A X .;a").unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.cell((1, 2)), Cell::Empty);
        assert_eq!(board.cell((0, 1)), Cell::Obstacle);
    }

    #[test]
    fn test_parse_blank_row_is_kept() {
        let board = parse_level("A .;;. a").unwrap();
        assert_eq!(board.height(), 3);
        assert_eq!(board.target_position(id('A')), Some((2, 1)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_level(""), Err(LevelError::Empty)));
        assert!(matches!(parse_level(" ; ;"), Err(LevelError::Empty)));
        assert!(matches!(
            parse_level("A . ;. #"),
            Err(LevelError::InvalidToken { row: 1, column: 1, .. })
        ));
        assert!(matches!(
            parse_level("A . A"),
            Err(LevelError::DuplicatePiece { piece: 'A', row: 0, column: 2 })
        ));
        assert!(matches!(
            parse_level("A a ;a ."),
            Err(LevelError::DuplicateTarget { target: 'a', row: 1, column: 0 })
        ));

        let too_wide = vec!["."; MAX_SIZE + 1].join(" ");
        assert!(matches!(
            parse_level(&too_wide),
            Err(LevelError::TooLarge { width: 65, height: 1 })
        ));
    }

    #[test]
    fn test_error_messages_name_the_token() {
        let err = parse_level("A . ;. ?").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid level: unrecognized token '?' at row 1, column 1"
        );
    }

    #[test]
    fn test_format_level() {
        let board = parse_level("A.X;.a").unwrap();
        assert_eq!(format_level(&board), "A . X;. a .");

        let board = parse_level("Ab B a").unwrap();
        assert_eq!(board.to_string(), "Ab B a");
    }

    #[test]
    fn test_round_trip() {
        for text in [
            "A . ;. a",
            "A B . ;X . . ;b a .",
            "Aa",
            "X X C B A ;X b . X . ;. . X X c ;X . . a . ",
            "Ba Ab;. X",
            "a",
        ] {
            let board = parse_level(text).unwrap();
            let reparsed = parse_level(&format_level(&board)).unwrap();
            assert_eq!(reparsed, board, "round trip of {:?}", text);
        }
    }

    #[test]
    fn test_levels_from_text() {
        let contents = "# two levels\n\nA . ;. a\n\n  Aa  \n";
        let levels = Levels::from_text(contents).unwrap();

        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get(0).unwrap().to_string(), "A .;. a");
        assert!(levels.get(1).unwrap().is_solved());
        assert!(levels.get(2).is_none());
    }

    #[test]
    fn test_levels_from_text_invalid_level() {
        let result = Levels::from_text("A . ;. a\nA ? a\n");
        assert!(matches!(
            result.unwrap_err(),
            LevelError::InvalidToken { row: 0, column: 1, .. }
        ));
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file("nonexistent_file.txt");
        assert!(matches!(result.unwrap_err(), LevelError::Io(_)));
    }
}
