//! Boundary validation for command fields.
//!
//! Runs on every [`Command`] before it reaches the room coordinator, so
//! the coordinator only ever sees well-shaped input. The coordinator still
//! re-checks domain rules (room exists, seat free, whose turn).

use othello_engine::{BOARD_SIZE, Position};

use crate::{Command, PositionInput, ProtocolError, RoomId};

/// Longest accepted chat message, counted in characters after trimming.
pub const MAX_CHAT_CHARS: usize = 500;

/// Longest accepted room id, in characters.
pub const MAX_ROOM_ID_CHARS: usize = 64;

/// Room ids are 1–64 characters of `[A-Za-z0-9_-]`.
pub fn room_id(id: &RoomId) -> Result<(), ProtocolError> {
    let s = id.as_str();
    if s.is_empty() {
        return Err(ProtocolError::validation("room_id", "must not be empty"));
    }
    if s.chars().count() > MAX_ROOM_ID_CHARS {
        return Err(ProtocolError::validation(
            "room_id",
            format!("must be at most {MAX_ROOM_ID_CHARS} characters"),
        ));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ProtocolError::validation(
            "room_id",
            "may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

/// Converts a client coordinate into an on-board [`Position`].
pub fn position(input: PositionInput) -> Result<Position, ProtocolError> {
    let max = BOARD_SIZE as i32 - 1;
    let check = |field: &'static str, value: i32| {
        if (0..=max).contains(&value) {
            Ok(value as u8)
        } else {
            Err(ProtocolError::validation(
                field,
                format!("{value} is outside 0..={max}"),
            ))
        }
    };
    Ok(Position::new(check("row", input.row)?, check("col", input.col)?))
}

/// Trims a chat message and checks it is 1–500 characters.
pub fn chat_message(message: &str) -> Result<&str, ProtocolError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::validation("message", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_CHAT_CHARS {
        return Err(ProtocolError::validation(
            "message",
            format!("must be at most {MAX_CHAT_CHARS} characters"),
        ));
    }
    Ok(trimmed)
}

impl Command {
    /// Checks every field of the command against the rules above.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::CreateRoom | Self::GetRooms => Ok(()),
            Self::JoinRoom { room_id: id, .. }
            | Self::Forfeit { room_id: id }
            | Self::ResetGame { room_id: id }
            | Self::LeaveRoom { room_id: id } => room_id(id),
            Self::MakeMove {
                room_id: id,
                position: pos,
            } => {
                room_id(id)?;
                position(*pos).map(|_| ())
            }
            Self::ChatMessage {
                room_id: id,
                message,
            } => {
                room_id(id)?;
                chat_message(message).map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_rules() {
        assert!(room_id(&"room-abc_12".into()).is_ok());
        assert!(room_id(&"".into()).is_err());
        assert!(room_id(&"has space".into()).is_err());
        assert!(room_id(&"ü".into()).is_err());
        assert!(room_id(&"a".repeat(64).into()).is_ok());
        assert!(room_id(&"a".repeat(65).into()).is_err());
    }

    #[test]
    fn test_position_range() {
        assert_eq!(
            position(PositionInput { row: 0, col: 7 }).unwrap(),
            Position::new(0, 7)
        );
        let err = position(PositionInput { row: -1, col: 0 }).unwrap_err();
        assert!(err.to_string().contains("row"));
        let err = position(PositionInput { row: 3, col: 8 }).unwrap_err();
        assert!(err.to_string().contains("col"));
    }

    #[test]
    fn test_chat_message_is_trimmed() {
        assert_eq!(chat_message("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn test_chat_message_length_limits() {
        assert!(chat_message("   ").is_err());
        assert!(chat_message(&"x".repeat(500)).is_ok());
        assert!(chat_message(&"x".repeat(501)).is_err());
        // Characters, not bytes.
        assert!(chat_message(&"é".repeat(500)).is_ok());
        // Surrounding whitespace doesn't count.
        assert!(chat_message(&format!("  {}  ", "x".repeat(500))).is_ok());
    }

    #[test]
    fn test_command_validate() {
        assert!(Command::GetRooms.validate().is_ok());
        assert!(
            Command::MakeMove {
                room_id: "r1".into(),
                position: PositionInput { row: 8, col: 0 },
            }
            .validate()
            .is_err()
        );
        assert!(
            Command::ChatMessage {
                room_id: "r1".into(),
                message: String::new(),
            }
            .validate()
            .is_err()
        );
        assert!(
            Command::JoinRoom {
                room_id: "bad id".into(),
                preferred_color: None,
            }
            .validate()
            .is_err()
        );
    }
}
