//! Room snapshots: the owned, serializable picture of a room that replies
//! and broadcasts carry.

use othello_engine::{Color, GameState};
use serde::{Deserialize, Serialize};

use crate::{ParticipantId, RoomId};

/// The two color seats of a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seats {
    pub black: Option<ParticipantId>,
    pub white: Option<ParticipantId>,
}

impl Seats {
    /// Who sits in `color`'s seat.
    pub fn get(&self, color: Color) -> Option<ParticipantId> {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn get_mut(&mut self, color: Color) -> &mut Option<ParticipantId> {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    /// The color `participant` plays, if seated.
    pub fn color_of(&self, participant: ParticipantId) -> Option<Color> {
        if self.black == Some(participant) {
            Some(Color::Black)
        } else if self.white == Some(participant) {
            Some(Color::White)
        } else {
            None
        }
    }

    /// First free seat, black before white.
    pub fn first_free(&self) -> Option<Color> {
        [Color::Black, Color::White]
            .into_iter()
            .find(|color| self.get(*color).is_none())
    }

    pub fn is_empty(&self) -> bool {
        self.black.is_none() && self.white.is_none()
    }

    pub fn is_full(&self) -> bool {
        self.black.is_some() && self.white.is_some()
    }
}

/// One line of room chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub participant_id: ParticipantId,
    /// Trimmed, 1–500 characters.
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Coarse room status for lobby listings. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    /// At least one color seat is empty.
    WaitingForPlayers,
    /// Both seats taken and the game is running.
    InProgress,
    /// The game ended (by score or forfeit); seats may still be filled.
    Finished,
}

impl RoomStatus {
    pub fn derive(seats: &Seats, game: &GameState) -> Self {
        if game.is_game_over {
            Self::Finished
        } else if seats.is_full() {
            Self::InProgress
        } else {
            Self::WaitingForPlayers
        }
    }
}

/// A point-in-time copy of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub players: Seats,
    /// In join order.
    pub spectators: Vec<ParticipantId>,
    pub status: RoomStatus,
    pub game_state: GameState,
    pub chat: Vec<ChatMessage>,
}

impl RoomSnapshot {
    /// Everyone who should receive a broadcast of this snapshot: black,
    /// white, then spectators in join order.
    pub fn members(&self) -> Vec<ParticipantId> {
        self.players
            .black
            .into_iter()
            .chain(self.players.white)
            .chain(self.spectators.iter().copied())
            .collect()
    }
}
