//! Error types for the room layer.

use othello_engine::{Color, MoveError};
use othello_protocol::{ParticipantId, ProtocolError, RoomId};

/// Errors that can occur during room operations.
///
/// Every variant is recoverable: the coordinator is left unchanged and
/// the caller reports the message back to whoever sent the command.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// A room with this id already exists.
    #[error("room {0} already exists")]
    RoomExists(RoomId),

    /// The requested color seat is held by someone else.
    #[error("{color} is already taken in room {room_id}")]
    ColorTaken { room_id: RoomId, color: Color },

    /// The participant already belongs to a different room.
    #[error("participant {participant_id} is already in room {current}")]
    AlreadyInAnotherRoom {
        participant_id: ParticipantId,
        current: RoomId,
    },

    /// The participant holds no color in this room (a spectator or an
    /// outsider trying to move or forfeit).
    #[error("participant {participant_id} is not a player in room {room_id}")]
    NotAPlayer {
        participant_id: ParticipantId,
        room_id: RoomId,
    },

    /// A player tried to move out of turn.
    #[error("not your turn: it is {expected}'s turn")]
    NotYourTurn { expected: Color },

    /// The engine refused the move.
    #[error("invalid move: {0}")]
    InvalidMove(MoveError),

    /// An input field failed validation.
    #[error(transparent)]
    Validation(#[from] ProtocolError),
}

/// Coarse classification of a [`RoomError`], used to pick a wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidMove,
    IllegalTurn,
    Validation,
}

impl ErrorKind {
    /// HTTP-style status code for [`ServerMessage::Error`](othello_protocol::ServerMessage::Error).
    pub fn code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InvalidMove => 422,
            Self::IllegalTurn => 403,
            Self::Validation => 400,
        }
    }
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound(_) => ErrorKind::NotFound,
            Self::RoomExists(_) | Self::ColorTaken { .. } | Self::AlreadyInAnotherRoom { .. } => {
                ErrorKind::Conflict
            }
            Self::NotAPlayer { .. } | Self::NotYourTurn { .. } => ErrorKind::IllegalTurn,
            Self::InvalidMove(e) if e.is_turn_violation() => ErrorKind::IllegalTurn,
            Self::InvalidMove(_) => ErrorKind::InvalidMove,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl From<MoveError> for RoomError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::NotYourTurn { expected } => Self::NotYourTurn { expected },
            other => Self::InvalidMove(other),
        }
    }
}
