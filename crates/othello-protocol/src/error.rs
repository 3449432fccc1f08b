//! Error types for the protocol layer.
//!
//! Everything that can go wrong before a command reaches the room
//! coordinator lands here: bytes that don't parse, frames that arrive in
//! the wrong order, and fields that parse but are out of range.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, unknown
    /// message type, or a value of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but breaks protocol rules, e.g. a request sent
    /// before the handshake.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A command field is out of range: a room id with bad characters,
    /// a position off the board, an empty or oversized chat message.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },
}

impl ProtocolError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
