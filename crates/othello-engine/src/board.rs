//! Board geometry: colors, positions, and the 8×8 grid.
//!
//! Everything here reads the grid as-is. The board never tracks scores or
//! whose turn it is; that belongs to [`GameState`](crate::GameState).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of rows (and columns) on an Othello board.
pub const BOARD_SIZE: usize = 8;

/// The eight compass directions as `(row delta, col delta)`.
const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One of the two sides. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::White => write!(f, "white"),
        }
    }
}

/// Contents of a single square: `None` is empty.
pub type Cell = Option<Color>;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A board coordinate, zero-based from the top-left corner.
///
/// Any `u8` pair is representable; coordinates of 8 or more are simply
/// off the board and every query treats them that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Returns `true` if both coordinates are in `0..8`.
    pub fn is_on_board(self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Iterates all 64 on-board positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Position { row, col }))
    }

    /// The neighbouring position one step in `dir`, or `None` past the edge.
    fn step(self, (dr, dc): (i8, i8)) -> Option<Position> {
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        let size = BOARD_SIZE as i16;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Position::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The 8×8 grid.
///
/// Serializes as a plain nested array: eight rows of eight
/// `null | "black" | "white"` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// A board with no pieces on it.
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The canonical opening: white on (3,3) and (4,4), black on (3,4)
    /// and (4,3).
    pub fn standard() -> Self {
        let mut board = Self::empty();
        let mid = (BOARD_SIZE / 2) as u8;
        board.set(Position::new(mid - 1, mid - 1), Some(Color::White));
        board.set(Position::new(mid - 1, mid), Some(Color::Black));
        board.set(Position::new(mid, mid - 1), Some(Color::Black));
        board.set(Position::new(mid, mid), Some(Color::White));
        board
    }

    /// Reads a square. Off-board positions read as empty.
    pub fn get(&self, pos: Position) -> Cell {
        if pos.is_on_board() {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }

    /// Writes a square. Off-board positions are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if pos.is_on_board() {
            self.cells[pos.row as usize][pos.col as usize] = cell;
        }
    }

    /// Counts the pieces of one color with a full scan.
    pub fn count(&self, color: Color) -> u8 {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell == Some(color))
            .count() as u8
    }

    /// Counts all occupied squares.
    pub fn occupied(&self) -> u8 {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count() as u8
    }

    /// Returns every opponent piece that placing `color` at `pos` would
    /// flip, across all eight directions.
    ///
    /// Empty when the move is illegal: off the board, occupied, or no
    /// direction has an opponent run capped by a `color` piece.
    pub fn flips_for(&self, pos: Position, color: Color) -> Vec<Position> {
        if !pos.is_on_board() || self.get(pos).is_some() {
            return Vec::new();
        }
        DIRECTIONS
            .iter()
            .flat_map(|dir| self.run_in_direction(pos, *dir, color))
            .collect()
    }

    /// Returns `true` if `color` may legally play at `pos`.
    pub fn is_valid_move(&self, pos: Position, color: Color) -> bool {
        pos.is_on_board()
            && self.get(pos).is_none()
            && DIRECTIONS
                .iter()
                .any(|dir| !self.run_in_direction(pos, *dir, color).is_empty())
    }

    /// All legal moves for `color`, row-major.
    pub fn legal_moves(&self, color: Color) -> Vec<Position> {
        Position::all()
            .filter(|pos| self.is_valid_move(*pos, color))
            .collect()
    }

    /// Returns `true` if `color` has at least one legal move.
    pub fn has_legal_move(&self, color: Color) -> bool {
        Position::all().any(|pos| self.is_valid_move(pos, color))
    }

    /// Walks from `from` in `dir` over a contiguous opponent run.
    ///
    /// The run is returned only when a `color` piece closes it. A run that
    /// reaches an empty square or the edge captures nothing.
    fn run_in_direction(
        &self,
        from: Position,
        dir: (i8, i8),
        color: Color,
    ) -> Vec<Position> {
        let opponent = color.opponent();
        let mut run = Vec::new();
        let mut cursor = from.step(dir);

        while let Some(pos) = cursor {
            match self.get(pos) {
                Some(c) if c == opponent => run.push(pos),
                Some(_) if !run.is_empty() => return run,
                _ => return Vec::new(),
            }
            cursor = pos.step(dir);
        }

        Vec::new()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_standard_board_has_four_center_pieces() {
        let board = Board::standard();
        assert_eq!(board.get(pos(3, 3)), Some(Color::White));
        assert_eq!(board.get(pos(3, 4)), Some(Color::Black));
        assert_eq!(board.get(pos(4, 3)), Some(Color::Black));
        assert_eq!(board.get(pos(4, 4)), Some(Color::White));
        assert_eq!(board.count(Color::Black), 2);
        assert_eq!(board.count(Color::White), 2);
        assert_eq!(board.occupied(), 4);
    }

    #[test]
    fn test_opening_moves_for_black() {
        let board = Board::standard();
        assert_eq!(
            board.legal_moves(Color::Black),
            vec![pos(2, 3), pos(3, 2), pos(4, 5), pos(5, 4)]
        );
    }

    #[test]
    fn test_opening_moves_for_white() {
        let board = Board::standard();
        assert_eq!(
            board.legal_moves(Color::White),
            vec![pos(2, 4), pos(3, 5), pos(4, 2), pos(5, 3)]
        );
    }

    #[test]
    fn test_off_board_is_never_valid() {
        let board = Board::standard();
        assert!(!board.is_valid_move(pos(8, 0), Color::Black));
        assert!(!board.is_valid_move(pos(0, 8), Color::Black));
        assert!(!board.is_valid_move(pos(255, 255), Color::White));
        assert!(board.flips_for(pos(9, 9), Color::Black).is_empty());
    }

    #[test]
    fn test_occupied_cell_is_not_valid() {
        let board = Board::standard();
        assert!(!board.is_valid_move(pos(3, 3), Color::Black));
        assert!(!board.is_valid_move(pos(3, 4), Color::White));
    }

    #[test]
    fn test_run_ending_at_edge_flips_nothing() {
        let mut board = Board::empty();
        board.set(pos(0, 0), Some(Color::White));
        board.set(pos(0, 1), Some(Color::White));
        // Playing (0,2) walks left over two whites and falls off the edge.
        assert!(!board.is_valid_move(pos(0, 2), Color::Black));
    }

    #[test]
    fn test_run_ending_at_empty_flips_nothing() {
        let mut board = Board::empty();
        board.set(pos(0, 1), Some(Color::White));
        board.set(pos(0, 2), Some(Color::White));
        // (0,3) walks left over two whites into the empty (0,0).
        assert!(!board.is_valid_move(pos(0, 3), Color::Black));
    }

    #[test]
    fn test_adjacent_own_piece_captures_nothing() {
        let mut board = Board::empty();
        board.set(pos(0, 0), Some(Color::Black));
        assert!(!board.is_valid_move(pos(0, 1), Color::Black));
    }

    #[test]
    fn test_flips_collect_every_bounded_direction() {
        // A star around (4,4): white ring, black ring behind it.
        let mut board = Board::empty();
        let center = pos(4, 4);
        for (dr, dc) in DIRECTIONS {
            let w = pos((4 + dr) as u8, (4 + dc) as u8);
            let b = pos((4 + 2 * dr) as u8, (4 + 2 * dc) as u8);
            board.set(w, Some(Color::White));
            board.set(b, Some(Color::Black));
        }
        let flips = board.flips_for(center, Color::Black);
        assert_eq!(flips.len(), 8);
    }

    #[test]
    fn test_flips_take_the_whole_run() {
        let mut board = Board::empty();
        board.set(pos(0, 0), Some(Color::Black));
        for col in 1..=5 {
            board.set(pos(0, col), Some(Color::White));
        }
        let flips = board.flips_for(pos(0, 6), Color::Black);
        assert_eq!(flips.len(), 5);
        assert!(flips.contains(&pos(0, 1)));
        assert!(flips.contains(&pos(0, 5)));
    }

    #[test]
    fn test_color_opponent_and_display() {
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.to_string(), "black");
    }

    #[test]
    fn test_position_all_covers_board() {
        assert_eq!(Position::all().count(), 64);
        assert!(Position::all().all(Position::is_on_board));
    }

    #[test]
    fn test_board_serializes_as_nested_array() {
        let json = serde_json::to_value(Board::standard()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 8);
        assert_eq!(json[3][3], "white");
        assert_eq!(json[3][4], "black");
        assert!(json[0][0].is_null());
    }
}
