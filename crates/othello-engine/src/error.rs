//! Why a move was refused.

use crate::{Color, Position};

/// Reasons [`OthelloGame::try_move`](crate::OthelloGame::try_move) rejects
/// a move. A rejected move never mutates the game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The game has already ended (board exhausted or forfeit).
    #[error("game is already over")]
    GameOver,

    /// The mover is not the side to play.
    #[error("it is {expected}'s turn")]
    NotYourTurn { expected: Color },

    /// The position is outside the 8×8 grid.
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),

    /// The target square already holds a piece.
    #[error("cell {0} is already occupied")]
    Occupied(Position),

    /// No direction has an opponent run capped by the mover's piece.
    #[error("move at {0} captures nothing")]
    NoCapture(Position),
}

impl MoveError {
    /// Returns `true` for refusals about *who* may move rather than
    /// *where*: the game being over or the wrong side moving.
    pub fn is_turn_violation(&self) -> bool {
        matches!(self, Self::GameOver | Self::NotYourTurn { .. })
    }
}
