//! Per-connection handler: handshake and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive Handshake → validate version
//!   2. Assign a ParticipantId → send HandshakeAck
//!   3. Loop: receive envelopes → heartbeat, request or disconnect
//!   4. On exit: leave the participant's room and tell whoever remains

use std::sync::Arc;

use othello_protocol::{
    ClientMessage, Codec, Command, Envelope, PROTOCOL_VERSION, ParticipantId, Payload,
    ProtocolError, ServerMessage,
};
use othello_room::LeaveOutcome;

use crate::ServerError;
use crate::dispatch;
use crate::server::ServerState;
use crate::transport::{Outbox, WebSocketConnection};

/// Drop guard that removes a participant from the server when the
/// handler exits, however it exits.
///
/// `Drop` is synchronous, so the async cleanup runs in a spawned task.
struct ParticipantGuard<C: Codec> {
    participant_id: ParticipantId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ParticipantGuard<C> {
    fn drop(&mut self) {
        let participant_id = self.participant_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            disconnect(&state, participant_id).await;
        });
    }
}

/// Forgets the connection, leaves the room and broadcasts the room's new
/// state to the members still in it.
async fn disconnect<C: Codec>(state: &ServerState<C>, participant_id: ParticipantId) {
    let mut rooms = state.rooms.lock().await;
    let mut connections = state.connections.lock().await;
    connections.remove(&participant_id);

    match rooms.leave_all(participant_id) {
        Some((room_id, LeaveOutcome::Left)) => match rooms.get_room(&room_id) {
            Ok(room) => state.broadcast(&connections, &room),
            Err(e) => tracing::warn!(%room_id, error = %e, "room vanished during disconnect"),
        },
        Some((room_id, _)) => {
            tracing::debug!(%room_id, %participant_id, "room closed on disconnect");
        }
        None => {}
    }
    tracing::info!(%participant_id, "participant disconnected");
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    mut conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");
    let outbox = conn.outbox().clone();

    // --- Step 1: Handshake ---
    let participant_id = perform_handshake(&mut conn, &state, &outbox).await?;
    tracing::info!(%conn_id, %participant_id, "participant connected");

    state
        .connections
        .lock()
        .await
        .insert(participant_id, outbox.clone());
    let _guard = ParticipantGuard {
        participant_id,
        state: Arc::clone(&state),
    };

    // --- Step 2: Message loop ---
    loop {
        let data = match tokio::time::timeout(state.config.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%participant_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%participant_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%participant_id, "connection timed out");
                outbox.close();
                break;
            }
        };

        let envelope: Envelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%participant_id, error = %e, "failed to decode envelope");
                send_error(&state, &outbox, 400, &e.to_string())?;
                continue;
            }
        };

        let msg = match envelope.payload {
            Payload::Client(msg) => msg,
            Payload::Server(_) => {
                send_error(&state, &outbox, 400, "clients may only send Client payloads")?;
                continue;
            }
        };

        match msg {
            ClientMessage::Heartbeat { client_time } => {
                let ack = ServerMessage::HeartbeatAck {
                    client_time,
                    server_time: state.server_time(),
                };
                state.send(&outbox, ack)?;
            }
            ClientMessage::Request {
                request_id,
                command,
            } => {
                handle_request(&state, &outbox, participant_id, request_id, command).await?;
            }
            ClientMessage::Disconnect { reason } => {
                tracing::info!(%participant_id, %reason, "client disconnected");
                outbox.close();
                break;
            }
            ClientMessage::Handshake { .. } => {
                send_error(&state, &outbox, 400, "handshake already completed")?;
            }
        }
    }

    // _guard drops here → room cleanup fires.
    Ok(())
}

/// Receives the Handshake, checks the version, assigns an id and acks.
async fn perform_handshake<C: Codec>(
    conn: &mut WebSocketConnection,
    state: &ServerState<C>,
    outbox: &Outbox,
) -> Result<ParticipantId, ServerError> {
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(invalid("connection closed before handshake"));
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            send_error(state, outbox, 408, "handshake timed out")?;
            return Err(invalid("handshake timed out"));
        }
    };

    let envelope: Envelope = match state.codec.decode(&data) {
        Ok(env) => env,
        Err(e) => {
            send_error(state, outbox, 400, &e.to_string())?;
            return Err(e.into());
        }
    };

    let version = match envelope.payload {
        Payload::Client(ClientMessage::Handshake { version }) => version,
        _ => {
            send_error(state, outbox, 400, "expected Handshake")?;
            return Err(invalid("first message must be Handshake"));
        }
    };

    if version != PROTOCOL_VERSION {
        send_error(
            state,
            outbox,
            400,
            &format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        )?;
        return Err(invalid("protocol version mismatch"));
    }

    let participant_id = state.next_participant_id();
    state.send(
        outbox,
        ServerMessage::HandshakeAck {
            participant_id,
            server_time: state.server_time(),
        },
    )?;
    Ok(participant_id)
}

/// Runs one command under the room lock and queues the reply, then the
/// broadcast, before releasing it, so members see updates in the order
/// they were applied.
async fn handle_request<C: Codec>(
    state: &ServerState<C>,
    outbox: &Outbox,
    participant_id: ParticipantId,
    request_id: u64,
    command: Command,
) -> Result<(), ServerError> {
    tracing::debug!(%participant_id, request_id, command = command.name(), "request");

    let mut rooms = state.rooms.lock().await;
    let execution = dispatch::execute(&mut rooms, participant_id, command, &mut rand::rng());
    state.send(
        outbox,
        ServerMessage::Reply {
            request_id,
            reply: execution.reply,
        },
    )?;

    if let Some(room) = execution.update {
        let connections = state.connections.lock().await;
        state.broadcast(&connections, &room);
    }
    Ok(())
}

/// Queues a `ServerMessage::Error` for the client.
fn send_error<C: Codec>(
    state: &ServerState<C>,
    outbox: &Outbox,
    code: u16,
    message: &str,
) -> Result<(), ServerError> {
    tracing::debug!(conn_id = %outbox.connection_id(), code, message, "sending error");
    state.send(
        outbox,
        ServerMessage::Error {
            code,
            message: message.to_string(),
        },
    )
}

fn invalid(reason: &str) -> ServerError {
    ProtocolError::InvalidMessage(reason.to_string()).into()
}
