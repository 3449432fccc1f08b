//! Room coordination for Othello.
//!
//! A [`RoomCoordinator`] owns every room: each room binds one long-lived
//! game, a black and a white seat, any number of spectators and a chat
//! log. Commands resolve the room by id, translate the participant into
//! a color and delegate to the engine.
//!
//! # Key types
//!
//! - [`RoomCoordinator`]: creates/deletes rooms, seats participants,
//!   applies moves, keeps the participant → room index
//! - [`LeaveOutcome`]: whether a leave closed the room
//! - [`RoomError`] / [`ErrorKind`]: what went wrong and how to report it

mod coordinator;
mod error;
mod room;

pub use coordinator::{LeaveOutcome, RoomCoordinator};
pub use error::{ErrorKind, RoomError};
pub use room::Seat;
