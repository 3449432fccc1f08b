//! `OthelloServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → room coordinator.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use othello_protocol::{
    Codec, Envelope, JsonCodec, ParticipantId, Payload, RoomSnapshot, ServerMessage,
};
use othello_room::RoomCoordinator;
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::transport::{Outbox, WebSocketTransport, serve_health_check, upgrade};
use crate::{ServerConfig, ServerError};

/// Shared server state passed to each connection handler task.
///
/// Lock order is `rooms` then `connections`, never the reverse.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomCoordinator>,
    /// Live connections by participant, for replies and broadcasts.
    pub(crate) connections: Mutex<HashMap<ParticipantId, Outbox>>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
    started: Instant,
    next_participant: AtomicU64,
}

impl<C: Codec> ServerState<C> {
    fn new(codec: C, config: ServerConfig) -> Self {
        Self {
            rooms: Mutex::new(RoomCoordinator::new()),
            connections: Mutex::new(HashMap::new()),
            codec,
            config,
            started: Instant::now(),
            next_participant: AtomicU64::new(1),
        }
    }

    pub(crate) fn next_participant_id(&self) -> ParticipantId {
        ParticipantId(self.next_participant.fetch_add(1, Ordering::Relaxed))
    }

    /// Milliseconds since the server started.
    pub(crate) fn server_time(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Wraps `msg` in the connection's next envelope and queues it.
    pub(crate) fn send(&self, outbox: &Outbox, msg: ServerMessage) -> Result<(), ServerError> {
        let envelope = Envelope {
            seq: outbox.next_seq(),
            timestamp: self.server_time(),
            payload: Payload::Server(msg),
        };
        let bytes = self.codec.encode(&envelope)?;
        outbox.send(bytes)?;
        Ok(())
    }

    /// Queues `RoomUpdated` for every member of the room that is still
    /// connected. A member whose writer is gone is skipped.
    pub(crate) fn broadcast(
        &self,
        connections: &HashMap<ParticipantId, Outbox>,
        room: &RoomSnapshot,
    ) {
        for participant_id in room.members() {
            let Some(outbox) = connections.get(&participant_id) else {
                continue;
            };
            let msg = ServerMessage::RoomUpdated { room: room.clone() };
            if let Err(e) = self.send(outbox, msg) {
                tracing::debug!(room_id = %room.id, %participant_id, error = %e, "broadcast skipped");
            }
        }
    }
}

/// Builder for configuring and starting an Othello server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), othello_server::ServerError> {
/// use othello_server::OthelloServer;
///
/// let server = OthelloServer::builder()
///     .bind("0.0.0.0:3001")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct OthelloServerBuilder {
    config: ServerConfig,
}

impl OthelloServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once, e.g. with [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Binds the listener. Uses [`JsonCodec`] for every connection.
    pub async fn build(self) -> Result<OthelloServer<JsonCodec>, ServerError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let state = Arc::new(ServerState::new(JsonCodec, self.config));
        Ok(OthelloServer { transport, state })
    }
}

/// A bound Othello server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct OthelloServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl OthelloServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> OthelloServerBuilder {
        OthelloServerBuilder::new()
    }
}

impl<C: Codec> OthelloServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Every accepted socket gets its own task, which answers
    /// `GET /health` or upgrades it to WebSocket and runs the connection
    /// handler. Runs until the
    /// process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Othello server running");

        loop {
            match self.transport.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let checked = tokio::time::timeout(
                            state.config.handshake_timeout,
                            serve_health_check(stream),
                        )
                        .await;
                        let stream = match checked {
                            Ok(Ok(Some(stream))) => stream,
                            Ok(Ok(None)) => {
                                tracing::debug!(%addr, "health check answered");
                                return;
                            }
                            Ok(Err(e)) => {
                                tracing::debug!(%addr, error = %e, "health check failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%addr, "no request before timeout");
                                return;
                            }
                        };
                        let conn = match upgrade(stream, addr).await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%addr, error = %e, "upgrade failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
