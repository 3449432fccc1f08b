//! Error types for the server.

use othello_protocol::ProtocolError;

/// Errors from the WebSocket layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Binding the listener or accepting a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Answering a `GET /health` request failed.
    #[error("health check failed: {0}")]
    HealthCheck(#[source] std::io::Error),

    /// Upgrading an accepted TCP stream to WebSocket failed.
    #[error("websocket handshake failed: {0}")]
    Upgrade(#[source] tokio_tungstenite::tungstenite::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] tokio_tungstenite::tungstenite::Error),
}

/// Top-level error that wraps every layer's errors.
///
/// Room refusals never appear here; they go back to the client as an
/// unsuccessful reply.
///
/// The `#[from]` attribute on each variant lets `?` convert layer
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
