//! The match state machine: one Othello game from opening to result.
//!
//! ```text
//! InProgress ──(no legal move for either side | forfeit)──→ GameOver
//! ```
//!
//! `GameOver` is terminal. The only way back is [`OthelloGame::reset`],
//! which replaces the whole state with a fresh opening.

use serde::{Deserialize, Serialize};

use crate::{Board, Color, MoveError, Position};

// ---------------------------------------------------------------------------
// Winner / GamePhase
// ---------------------------------------------------------------------------

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Black,
    White,
    Draw,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Self::Black,
            Color::White => Self::White,
        }
    }
}

/// Lifecycle of a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    InProgress,
    GameOver,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Everything a client needs to render a match.
///
/// `black_score` and `white_score` are always a full recount of `board`.
/// `winner` is `Some` only once `is_game_over` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub current_player: Color,
    pub black_score: u8,
    pub white_score: u8,
    pub is_game_over: bool,
    pub winner: Option<Winner>,
    pub last_move: Option<Position>,
}

impl GameState {
    /// The canonical opening position, black to move.
    pub fn new() -> Self {
        let mut state = Self {
            board: Board::standard(),
            current_player: Color::Black,
            black_score: 0,
            white_score: 0,
            is_game_over: false,
            winner: None,
            last_move: None,
        };
        state.recount_scores();
        state
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_game_over {
            GamePhase::GameOver
        } else {
            GamePhase::InProgress
        }
    }

    pub fn score(&self, color: Color) -> u8 {
        match color {
            Color::Black => self.black_score,
            Color::White => self.white_score,
        }
    }

    fn recount_scores(&mut self) {
        self.black_score = self.board.count(Color::Black);
        self.white_score = self.board.count(Color::White);
    }

    /// Strict comparison of the current scores.
    fn leader(&self) -> Winner {
        match self.black_score.cmp(&self.white_score) {
            std::cmp::Ordering::Greater => Winner::Black,
            std::cmp::Ordering::Less => Winner::White,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Move results
// ---------------------------------------------------------------------------

/// Who plays after a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The opponent has a legal move and plays next.
    Next(Color),
    /// The opponent had no legal move and was skipped; the mover goes again.
    Pass { skipped: Color },
    /// Neither side can move. The game is over.
    Finished(Winner),
}

/// What a successful move did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Opponent pieces turned over, grouped by direction.
    pub flipped: Vec<Position>,
    pub turn: Turn,
}

// ---------------------------------------------------------------------------
// OthelloGame
// ---------------------------------------------------------------------------

/// A single Othello match.
///
/// One instance lives for the whole match. Callers mutate it only
/// through [`try_move`](Self::try_move), [`make_move`](Self::make_move),
/// [`forfeit`](Self::forfeit) and [`reset`](Self::reset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OthelloGame {
    state: GameState,
}

impl OthelloGame {
    pub fn new() -> Self {
        Self {
            state: GameState::new(),
        }
    }

    /// Starts a game from an arbitrary board with `to_move` on turn.
    ///
    /// Scores are recounted from the board. Whether the position is
    /// already finished is not evaluated until the next move.
    pub fn from_board(board: Board, to_move: Color) -> Self {
        let mut state = GameState {
            board,
            current_player: to_move,
            ..GameState::new()
        };
        state.recount_scores();
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct board access for collaborators that edit squares themselves.
    ///
    /// Scores catch up on the next successful move; validity checks read
    /// whatever is on the board right now.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.state.board
    }

    pub fn current_player(&self) -> Color {
        self.state.current_player
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over
    }

    pub fn is_valid_move(&self, pos: Position, color: Color) -> bool {
        self.state.board.is_valid_move(pos, color)
    }

    pub fn legal_moves(&self, color: Color) -> Vec<Position> {
        self.state.board.legal_moves(color)
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        self.state.board.has_legal_move(color)
    }

    pub fn flips_for(&self, pos: Position, color: Color) -> Vec<Position> {
        self.state.board.flips_for(pos, color)
    }

    /// Plays `color` at `pos`, returning `false` without touching the
    /// game if the move is refused for any reason.
    pub fn make_move(&mut self, pos: Position, color: Color) -> bool {
        self.try_move(pos, color).is_ok()
    }

    /// Plays `color` at `pos`.
    ///
    /// On success the piece is placed, every bounded run is flipped, both
    /// scores are recounted, `last_move` is recorded and the turn advances:
    /// the opponent plays next if it can, otherwise the mover goes again,
    /// and if neither side can move the game ends on score.
    pub fn try_move(
        &mut self,
        pos: Position,
        color: Color,
    ) -> Result<MoveOutcome, MoveError> {
        self.check_move(pos, color)?;

        let flipped = self.state.board.flips_for(pos, color);
        if flipped.is_empty() {
            return Err(MoveError::NoCapture(pos));
        }

        self.state.board.set(pos, Some(color));
        for square in &flipped {
            self.state.board.set(*square, Some(color));
        }
        self.state.recount_scores();
        self.state.last_move = Some(pos);

        let turn = self.advance_turn(color);
        Ok(MoveOutcome { flipped, turn })
    }

    /// Ends the game immediately with `color`'s opponent as winner.
    ///
    /// Applies in any phase, including a game that already finished; the
    /// board is left as it is.
    pub fn forfeit(&mut self, color: Color) {
        self.state.is_game_over = true;
        self.state.winner = Some(color.opponent().into());
    }

    /// Back to the canonical opening.
    pub fn reset(&mut self) {
        self.state = GameState::new();
    }

    /// Precondition checks in the order callers see them: phase, turn,
    /// bounds, occupancy.
    fn check_move(&self, pos: Position, color: Color) -> Result<(), MoveError> {
        if self.state.is_game_over {
            return Err(MoveError::GameOver);
        }
        if color != self.state.current_player {
            return Err(MoveError::NotYourTurn {
                expected: self.state.current_player,
            });
        }
        if !pos.is_on_board() {
            return Err(MoveError::OutOfBounds(pos));
        }
        if self.state.board.get(pos).is_some() {
            return Err(MoveError::Occupied(pos));
        }
        Ok(())
    }

    /// Hands the turn to the opponent, or back to `mover` when the
    /// opponent is stuck, or ends the game when both are.
    fn advance_turn(&mut self, mover: Color) -> Turn {
        let opponent = mover.opponent();
        self.state.current_player = opponent;

        if self.state.board.has_legal_move(opponent) {
            return Turn::Next(opponent);
        }
        if self.state.board.has_legal_move(mover) {
            self.state.current_player = mover;
            return Turn::Pass { skipped: opponent };
        }

        let winner = self.state.leader();
        self.state.is_game_over = true;
        self.state.winner = Some(winner);
        Turn::Finished(winner)
    }
}
