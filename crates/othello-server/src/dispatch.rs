//! Turns one [`Command`] into coordinator calls.
//!
//! Synchronous: the handler runs it while holding the room
//! lock, then queues the reply and the broadcast before letting go.

use othello_protocol::{Command, ParticipantId, Reply, RoomId, RoomSnapshot, validate};
use othello_room::{LeaveOutcome, RoomCoordinator, RoomError};
use rand::Rng;

/// Error text for every refused move except a missing room.
pub(crate) const INVALID_MOVE: &str = "Invalid move";

/// What to send after a command ran.
#[derive(Debug)]
pub(crate) struct Execution {
    /// Goes back to the sender only.
    pub(crate) reply: Reply,
    /// Fresh room state for every member, if the room changed.
    pub(crate) update: Option<RoomSnapshot>,
}

impl Execution {
    fn ok() -> Self {
        Self {
            reply: Reply::ok(),
            update: None,
        }
    }

    fn failed(code: u16, error: impl Into<String>) -> Self {
        Self {
            reply: Reply::failure(code, error),
            update: None,
        }
    }

    fn joined(room: RoomSnapshot) -> Self {
        Self {
            reply: Reply::with_room(room.clone()),
            update: Some(room),
        }
    }
}

/// Validates and runs a command on behalf of `participant_id`.
///
/// Never fails: every refusal becomes an unsuccessful [`Reply`] and the
/// coordinator is left as it was.
pub(crate) fn execute<R: Rng>(
    rooms: &mut RoomCoordinator,
    participant_id: ParticipantId,
    command: Command,
    rng: &mut R,
) -> Execution {
    let name = command.name();
    if let Err(e) = command.validate() {
        tracing::debug!(%participant_id, command = name, error = %e, "invalid command");
        return Execution::failed(400, e.to_string());
    }

    match run(rooms, participant_id, command, rng) {
        Ok(execution) => execution,
        Err(e) => {
            tracing::debug!(%participant_id, command = name, error = %e, "command refused");
            Execution::failed(e.kind().code(), e.to_string())
        }
    }
}

fn run<R: Rng>(
    rooms: &mut RoomCoordinator,
    participant_id: ParticipantId,
    command: Command,
    rng: &mut R,
) -> Result<Execution, RoomError> {
    match command {
        Command::CreateRoom => Ok(Execution::joined(rooms.open_room(participant_id, rng)?)),

        Command::JoinRoom {
            room_id,
            preferred_color,
        } => Ok(Execution::joined(rooms.join_room(
            &room_id,
            participant_id,
            preferred_color,
        )?)),

        Command::MakeMove { room_id, position } => {
            let position = validate::position(position)?;
            match rooms.make_move(&room_id, participant_id, position) {
                Ok(_) => updated(rooms, &room_id),
                Err(e @ RoomError::RoomNotFound(_)) => Err(e),
                Err(e) => {
                    tracing::debug!(%room_id, %participant_id, error = %e, "move refused");
                    Ok(Execution::failed(e.kind().code(), INVALID_MOVE))
                }
            }
        }

        Command::Forfeit { room_id } => {
            rooms.forfeit_game(&room_id, participant_id)?;
            updated(rooms, &room_id)
        }

        Command::ChatMessage { room_id, message } => {
            rooms.add_chat_message(&room_id, participant_id, &message)?;
            updated(rooms, &room_id)
        }

        Command::ResetGame { room_id } => {
            rooms.reset_game(&room_id)?;
            updated(rooms, &room_id)
        }

        Command::GetRooms => Ok(Execution {
            reply: Reply::with_rooms(rooms.list_rooms()),
            update: None,
        }),

        Command::LeaveRoom { room_id } => match rooms.leave_room(&room_id, participant_id)? {
            LeaveOutcome::Left => updated(rooms, &room_id),
            LeaveOutcome::RoomClosed | LeaveOutcome::NotPresent => Ok(Execution::ok()),
        },
    }
}

fn updated(rooms: &RoomCoordinator, room_id: &RoomId) -> Result<Execution, RoomError> {
    Ok(Execution {
        reply: Reply::ok(),
        update: Some(rooms.get_room(room_id)?),
    })
}
