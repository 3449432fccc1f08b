//! A single room: one game, two seats, spectators and chat.

use othello_engine::{Color, OthelloGame};
use othello_protocol::{ChatMessage, ParticipantId, RoomId, RoomSnapshot, RoomStatus, Seats};

use crate::RoomError;

/// Where a participant ended up after joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player(Color),
    Spectator,
}

/// Room state owned by the coordinator.
///
/// The game lives as long as the room; reset swaps its state, never the
/// instance.
#[derive(Debug)]
pub(crate) struct Room {
    id: RoomId,
    game: OthelloGame,
    seats: Seats,
    spectators: Vec<ParticipantId>,
    chat: Vec<ChatMessage>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            game: OthelloGame::new(),
            seats: Seats::default(),
            spectators: Vec::new(),
            chat: Vec::new(),
        }
    }

    pub(crate) fn game(&self) -> &OthelloGame {
        &self.game
    }

    pub(crate) fn game_mut(&mut self) -> &mut OthelloGame {
        &mut self.game
    }

    pub(crate) fn seat_of(&self, participant_id: ParticipantId) -> Option<Seat> {
        if let Some(color) = self.seats.color_of(participant_id) {
            Some(Seat::Player(color))
        } else if self.spectators.contains(&participant_id) {
            Some(Seat::Spectator)
        } else {
            None
        }
    }

    /// Seats a newcomer.
    ///
    /// With a preference, that color or nothing. Without one: black if
    /// free, then white, then the spectator list. Callers handle members
    /// who are already seated.
    pub(crate) fn seat(
        &mut self,
        participant_id: ParticipantId,
        preferred: Option<Color>,
    ) -> Result<Seat, RoomError> {
        let color = match preferred {
            Some(color) if self.seats.get(color).is_some() => {
                return Err(RoomError::ColorTaken {
                    room_id: self.id.clone(),
                    color,
                });
            }
            Some(color) => Some(color),
            None => self.seats.first_free(),
        };

        match color {
            Some(color) => {
                *self.seats.get_mut(color) = Some(participant_id);
                Ok(Seat::Player(color))
            }
            None => {
                self.spectators.push(participant_id);
                Ok(Seat::Spectator)
            }
        }
    }

    /// Clears whichever slot held the participant. Returns what it was.
    pub(crate) fn unseat(&mut self, participant_id: ParticipantId) -> Option<Seat> {
        let seat = self.seat_of(participant_id)?;
        match seat {
            Seat::Player(color) => *self.seats.get_mut(color) = None,
            Seat::Spectator => self.spectators.retain(|p| *p != participant_id),
        }
        Some(seat)
    }

    /// No players and no spectators.
    pub(crate) fn is_vacant(&self) -> bool {
        self.seats.is_empty() && self.spectators.is_empty()
    }

    pub(crate) fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push(message);
    }

    pub(crate) fn members(&self) -> Vec<ParticipantId> {
        self.seats
            .black
            .into_iter()
            .chain(self.seats.white)
            .chain(self.spectators.iter().copied())
            .collect()
    }

    pub(crate) fn snapshot(&self) -> RoomSnapshot {
        let game_state = self.game.state().clone();
        RoomSnapshot {
            id: self.id.clone(),
            status: RoomStatus::derive(&self.seats, &game_state),
            players: self.seats.clone(),
            spectators: self.spectators.clone(),
            game_state,
            chat: self.chat.clone(),
        }
    }
}
