//! Othello rules engine.
//!
//! A pure, synchronous state machine for a single match. No I/O, no
//! clocks, no knowledge of rooms or participants.
//!
//! # Key types
//!
//! - [`OthelloGame`]: one match (validate, move, forfeit, reset)
//! - [`GameState`]: the serializable snapshot clients render
//! - [`Board`], [`Position`], [`Color`]: board geometry
//! - [`MoveError`]: why a move was refused

mod board;
mod error;
mod game;

pub use board::{BOARD_SIZE, Board, Cell, Color, Position};
pub use error::MoveError;
pub use game::{GamePhase, GameState, MoveOutcome, OthelloGame, Turn, Winner};
