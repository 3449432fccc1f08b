//! Room coordinator: creates, tracks, and routes participants to rooms.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use othello_engine::{Color, MoveOutcome, Position, Turn};
use othello_protocol::{ChatMessage, ParticipantId, RoomId, RoomSnapshot, validate};
use rand::Rng;

use crate::room::{Room, Seat};
use crate::RoomError;

/// Characters used in generated room ids.
const ROOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random characters after the `room-` prefix.
const ROOM_ID_SUFFIX_LEN: usize = 8;

/// Result of [`RoomCoordinator::leave_room`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The participant left; the room still has members.
    Left,
    /// The participant was the last member and the room was deleted.
    RoomClosed,
    /// The participant was not in this room. Nothing changed.
    NotPresent,
}

/// Owns every room and tracks which participant is in which room.
///
/// All methods are synchronous transitions on `&mut self`; the server
/// serializes access by holding it behind one lock.
#[derive(Debug, Default)]
pub struct RoomCoordinator {
    /// Active rooms, keyed by room ID.
    rooms: HashMap<RoomId, Room>,

    /// Maps each participant to the room they're currently in.
    /// A participant is in at most ONE room at a time.
    participant_rooms: HashMap<ParticipantId, RoomId>,
}

impl RoomCoordinator {
    /// Creates a new, empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Room lifecycle
    // -----------------------------------------------------------------------

    /// Creates an empty room with a fresh game.
    pub fn create_room(&mut self, room_id: RoomId) -> Result<RoomSnapshot, RoomError> {
        validate::room_id(&room_id)?;
        if self.rooms.contains_key(&room_id) {
            return Err(RoomError::RoomExists(room_id));
        }
        Ok(self.insert_room(room_id))
    }

    /// Creates an empty room under a fresh `room-xxxxxxxx` id.
    pub fn create_room_with_generated_id<R: Rng>(&mut self, rng: &mut R) -> RoomSnapshot {
        loop {
            let room_id = generate_room_id(rng);
            if !self.rooms.contains_key(&room_id) {
                return self.insert_room(room_id);
            }
        }
    }

    /// Creates a room under a generated id and seats `creator` as black.
    ///
    /// Refused up front if the creator is already in a room, so a failed
    /// open never leaves an empty room behind.
    pub fn open_room<R: Rng>(
        &mut self,
        creator: ParticipantId,
        rng: &mut R,
    ) -> Result<RoomSnapshot, RoomError> {
        self.ensure_not_elsewhere(creator, None)?;
        let room_id = self.create_room_with_generated_id(rng).id;
        self.join_room(&room_id, creator, Some(Color::Black))
    }

    fn insert_room(&mut self, room_id: RoomId) -> RoomSnapshot {
        let room = Room::new(room_id.clone());
        let snapshot = room.snapshot();
        tracing::info!(%room_id, "room created");
        self.rooms.insert(room_id, room);
        snapshot
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds a participant to a room.
    ///
    /// Rejoining the same room is a no-op that returns the current
    /// snapshot. Joining while in a different room is refused.
    pub fn join_room(
        &mut self,
        room_id: &RoomId,
        participant_id: ParticipantId,
        preferred_color: Option<Color>,
    ) -> Result<RoomSnapshot, RoomError> {
        self.ensure_not_elsewhere(participant_id, Some(room_id))?;
        let room = self.room_mut(room_id)?;

        if room.seat_of(participant_id).is_some() {
            return Ok(room.snapshot());
        }

        let seat = room.seat(participant_id, preferred_color)?;
        let snapshot = room.snapshot();
        self.participant_rooms.insert(participant_id, room_id.clone());

        match seat {
            Seat::Player(color) => {
                tracing::info!(%room_id, %participant_id, %color, "player joined");
            }
            Seat::Spectator => {
                tracing::info!(%room_id, %participant_id, "spectator joined");
            }
        }
        Ok(snapshot)
    }

    /// Removes a participant from a room, deleting the room once it has
    /// no players and no spectators.
    pub fn leave_room(
        &mut self,
        room_id: &RoomId,
        participant_id: ParticipantId,
    ) -> Result<LeaveOutcome, RoomError> {
        let room = self.room_mut(room_id)?;
        if room.unseat(participant_id).is_none() {
            return Ok(LeaveOutcome::NotPresent);
        }
        let vacant = room.is_vacant();

        if self.participant_rooms.get(&participant_id) == Some(room_id) {
            self.participant_rooms.remove(&participant_id);
        }
        tracing::info!(%room_id, %participant_id, "participant left");

        if vacant {
            self.rooms.remove(room_id);
            tracing::info!(%room_id, "room closed");
            return Ok(LeaveOutcome::RoomClosed);
        }
        Ok(LeaveOutcome::Left)
    }

    /// Disconnect cleanup: leaves whatever room the participant is in.
    pub fn leave_all(&mut self, participant_id: ParticipantId) -> Option<(RoomId, LeaveOutcome)> {
        let room_id = self.participant_rooms.get(&participant_id)?.clone();
        match self.leave_room(&room_id, participant_id) {
            Ok(outcome) => Some((room_id, outcome)),
            Err(e) => {
                // Index pointed at a room that no longer exists.
                tracing::warn!(%room_id, %participant_id, error = %e, "stale room index entry");
                self.participant_rooms.remove(&participant_id);
                None
            }
        }
    }

    /// The room a participant is currently in, if any.
    pub fn room_of(&self, participant_id: &ParticipantId) -> Option<&RoomId> {
        self.participant_rooms.get(participant_id)
    }

    /// Where the participant sits in a room, if anywhere.
    pub fn seat_of(
        &self,
        room_id: &RoomId,
        participant_id: ParticipantId,
    ) -> Result<Option<Seat>, RoomError> {
        Ok(self.room(room_id)?.seat_of(participant_id))
    }

    /// Black, white, then spectators in join order.
    pub fn members(&self, room_id: &RoomId) -> Result<Vec<ParticipantId>, RoomError> {
        Ok(self.room(room_id)?.members())
    }

    // -----------------------------------------------------------------------
    // Game actions
    // -----------------------------------------------------------------------

    /// Plays a move for whichever color the participant holds.
    ///
    /// A refused move leaves the game untouched.
    pub fn make_move(
        &mut self,
        room_id: &RoomId,
        participant_id: ParticipantId,
        position: Position,
    ) -> Result<MoveOutcome, RoomError> {
        let room = self.room_mut(room_id)?;
        let color = player_color(room, room_id, participant_id)?;

        let outcome = room.game_mut().try_move(position, color).map_err(|e| {
            tracing::debug!(%room_id, %participant_id, %position, error = %e, "move rejected");
            RoomError::from(e)
        })?;

        tracing::debug!(
            %room_id,
            %participant_id,
            %position,
            flipped = outcome.flipped.len(),
            "move played"
        );
        match outcome.turn {
            Turn::Pass { skipped } => {
                tracing::info!(%room_id, %skipped, "turn passed");
            }
            Turn::Finished(winner) => {
                let state = room.game().state();
                tracing::info!(
                    %room_id,
                    ?winner,
                    black = state.black_score,
                    white = state.white_score,
                    "game over"
                );
            }
            Turn::Next(_) => {}
        }
        Ok(outcome)
    }

    /// Concedes the game on behalf of the participant's color.
    pub fn forfeit_game(
        &mut self,
        room_id: &RoomId,
        participant_id: ParticipantId,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(room_id)?;
        let color = player_color(room, room_id, participant_id)?;
        room.game_mut().forfeit(color);
        tracing::info!(%room_id, %participant_id, %color, "game forfeited");
        Ok(())
    }

    /// Appends a chat line. Open to anyone who names the room.
    ///
    /// The stored text is trimmed and must be 1–500 characters.
    pub fn add_chat_message(
        &mut self,
        room_id: &RoomId,
        participant_id: ParticipantId,
        message: &str,
    ) -> Result<ChatMessage, RoomError> {
        let room = self.room_mut(room_id)?;
        let text = validate::chat_message(message)?;
        let entry = ChatMessage {
            participant_id,
            message: text.to_string(),
            timestamp: now_millis(),
        };
        room.push_chat(entry.clone());
        tracing::debug!(%room_id, %participant_id, "chat message");
        Ok(entry)
    }

    /// Starts a fresh game. Seats, spectators and chat stay as they are.
    pub fn reset_game(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        self.room_mut(room_id)?.game_mut().reset();
        tracing::info!(%room_id, "game reset");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get_room(&self, room_id: &RoomId) -> Result<RoomSnapshot, RoomError> {
        Ok(self.room(room_id)?.snapshot())
    }

    /// Snapshots of every room, ordered by id.
    pub fn list_rooms(&self) -> Vec<RoomSnapshot> {
        let mut rooms: Vec<_> = self.rooms.values().map(Room::snapshot).collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all active room IDs.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn room(&self, room_id: &RoomId) -> Result<&Room, RoomError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))
    }

    fn room_mut(&mut self, room_id: &RoomId) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))
    }

    /// One room per participant: refuse if they are in any room other
    /// than `allowed`.
    fn ensure_not_elsewhere(
        &self,
        participant_id: ParticipantId,
        allowed: Option<&RoomId>,
    ) -> Result<(), RoomError> {
        match self.participant_rooms.get(&participant_id) {
            Some(current) if Some(current) != allowed => Err(RoomError::AlreadyInAnotherRoom {
                participant_id,
                current: current.clone(),
            }),
            _ => Ok(()),
        }
    }
}

fn player_color(
    room: &Room,
    room_id: &RoomId,
    participant_id: ParticipantId,
) -> Result<Color, RoomError> {
    match room.seat_of(participant_id) {
        Some(Seat::Player(color)) => Ok(color),
        _ => Err(RoomError::NotAPlayer {
            participant_id,
            room_id: room_id.clone(),
        }),
    }
}

fn generate_room_id<R: Rng>(rng: &mut R) -> RoomId {
    let suffix: String = (0..ROOM_ID_SUFFIX_LEN)
        .map(|_| char::from(ROOM_ID_ALPHABET[rng.random_range(0..ROOM_ID_ALPHABET.len())]))
        .collect();
    RoomId::new(format!("room-{suffix}"))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
