//! Wire protocol for Othello rooms.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`Envelope`], [`ClientMessage`], [`ServerMessage`],
//!   [`Command`], [`Reply`]): the message structures on the wire.
//! - **Snapshots** ([`RoomSnapshot`], [`Seats`], [`ChatMessage`]): the
//!   owned picture of a room that replies and broadcasts carry.
//! - **Validation** ([`validate`]): field rules checked at the boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): envelopes to bytes and back.
//!
//! ```text
//! WebSocket (bytes) → Codec (Envelope) → validate → RoomCoordinator
//! ```

mod codec;
mod error;
mod snapshot;
mod types;
pub mod validate;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use snapshot::{ChatMessage, RoomSnapshot, RoomStatus, Seats};
pub use types::{
    ClientMessage, Command, Envelope, ParticipantId, Payload, PositionInput, Reply, RoomId,
    ServerMessage,
};

/// Protocol version a client must announce in its handshake.
pub const PROTOCOL_VERSION: u32 = 1;
