//! Core protocol types: identities, commands, replies and the envelope
//! every frame travels in.

use std::fmt;

use othello_engine::Color;
use serde::{Deserialize, Serialize};

use crate::RoomSnapshot;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for one connected participant (player or spectator).
///
/// Assigned by the server per connection and stable for that connection
/// only. `#[serde(transparent)]` makes it a plain number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of a room, chosen by whoever creates it.
///
/// A plain string on the wire. Format rules live in
/// [`validate::room_id`](crate::validate::room_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A board coordinate exactly as the client sent it.
///
/// Signed and wide on purpose: `{"row": -1}` must reach validation and be
/// rejected there with a readable reason, not fail JSON parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInput {
    pub row: i32,
    pub col: i32,
}

/// Something a participant asks the server to do.
///
/// Internally tagged on `"command"` with snake_case names, so a move is
/// `{"command": "make_move", "room_id": "r1", "position": {"row": 2, "col": 3}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Create a room with a server-generated id and take the black seat.
    CreateRoom,

    /// Join a room, optionally asking for a specific color.
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        preferred_color: Option<Color>,
    },

    MakeMove {
        room_id: RoomId,
        position: PositionInput,
    },

    Forfeit {
        room_id: RoomId,
    },

    ChatMessage {
        room_id: RoomId,
        message: String,
    },

    ResetGame {
        room_id: RoomId,
    },

    GetRooms,

    /// Leave without disconnecting.
    LeaveRoom {
        room_id: RoomId,
    },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::MakeMove { .. } => "make_move",
            Self::Forfeit { .. } => "forfeit",
            Self::ChatMessage { .. } => "chat_message",
            Self::ResetGame { .. } => "reset_game",
            Self::GetRooms => "get_rooms",
            Self::LeaveRoom { .. } => "leave_room",
        }
    }
}

/// The answer to one [`Command`], sent only to the participant who asked.
///
/// Mirrors the `{success, error?, room?, rooms?}` shape web clients expect;
/// absent fields are omitted rather than sent as `null`. Failures also
/// carry an HTTP-style `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<RoomSnapshot>>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: None,
            error: None,
            room: None,
            rooms: None,
        }
    }

    pub fn with_room(room: RoomSnapshot) -> Self {
        Self {
            room: Some(room),
            ..Self::ok()
        }
    }

    pub fn with_rooms(rooms: Vec<RoomSnapshot>) -> Self {
        Self {
            rooms: Some(rooms),
            ..Self::ok()
        }
    }

    pub fn failure(code: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            error: Some(error.into()),
            room: None,
            rooms: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Client / server messages
// ---------------------------------------------------------------------------

/// Everything a client can send. Internally tagged on `"type"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Must be the first frame on a connection.
    Handshake { version: u32 },

    /// Keep-alive. Any frame resets the idle timer; this one also gets an
    /// ack with the server clock.
    Heartbeat { client_time: u64 },

    /// A command. `request_id` is echoed in the matching [`Reply`].
    Request { request_id: u64, command: Command },

    /// "I'm leaving." The server closes the connection and runs the same
    /// cleanup as an unexpected drop.
    Disconnect { reason: String },
}

/// Everything the server can send. Internally tagged on `"type"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Handshake accepted; tells the client its participant id.
    HandshakeAck {
        participant_id: ParticipantId,
        server_time: u64,
    },

    HeartbeatAck {
        client_time: u64,
        server_time: u64,
    },

    /// Answer to a [`ClientMessage::Request`].
    Reply { request_id: u64, reply: Reply },

    /// Broadcast to every member of a room after it changes.
    RoomUpdated { room: RoomSnapshot },

    /// A connection-level failure outside any request. `code` follows
    /// HTTP conventions (400 bad request, 404 not found, ...).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Which side a frame came from.
///
/// Adjacently tagged: `{"type": "Client", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Client(ClientMessage),
    Server(ServerMessage),
}

/// The top-level wire frame. One envelope per WebSocket message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-sender counter, starting at 0 with the handshake.
    pub seq: u64,

    /// Milliseconds since the sender started (server: since startup).
    pub timestamp: u64,

    pub payload: Payload,
}
