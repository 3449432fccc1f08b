//! WebSocket transport built on `tokio-tungstenite`.
//!
//! Each connection is split in two: the handler task owns the read half,
//! and a dedicated writer task owns the write half, fed through an
//! [`Outbox`]. Any task can queue frames for any connection without
//! waiting on that connection's socket.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::TransportError;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// Opaque identifier for a connection, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Listens for TCP connections to upgrade.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next TCP connection. The WebSocket upgrade happens
    /// later in [`upgrade`], off the accept loop.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), TransportError> {
        self.listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

const HEALTH_REQUEST: &[u8] = b"GET /health ";
const HEALTH_BODY: &str = r#"{"status":"ok"}"#;
/// Request headers past this size are not read before answering.
const MAX_HEALTH_REQUEST: usize = 4096;

/// Answers a plain `GET /health` on a freshly accepted socket.
///
/// Peeks at the request line without consuming it. Anything else is
/// handed back untouched for [`upgrade`]; `Ok(None)` means the health
/// check was answered and the socket is done.
pub async fn serve_health_check(
    mut stream: TcpStream,
) -> Result<Option<TcpStream>, TransportError> {
    let mut line = [0u8; HEALTH_REQUEST.len()];
    loop {
        let n = stream
            .peek(&mut line)
            .await
            .map_err(TransportError::HealthCheck)?;
        if n == 0 || !HEALTH_REQUEST.starts_with(&line[..n]) {
            return Ok(Some(stream));
        }
        if n == HEALTH_REQUEST.len() {
            break;
        }
        // Only part of the request line has arrived.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // Drain the headers so closing does not reset the connection.
    let mut request = Vec::new();
    let mut chunk = [0u8; 512];
    while !headers_done(&request) && request.len() < MAX_HEALTH_REQUEST {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(TransportError::HealthCheck)?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{HEALTH_BODY}",
        HEALTH_BODY.len()
    );
    stream
        .write_all(response.as_bytes())
        .await
        .map_err(TransportError::HealthCheck)?;
    stream
        .shutdown()
        .await
        .map_err(TransportError::HealthCheck)?;
    Ok(None)
}

fn headers_done(request: &[u8]) -> bool {
    request.windows(4).any(|w| w == b"\r\n\r\n")
}

// ---------------------------------------------------------------------------
// Upgrade
// ---------------------------------------------------------------------------

/// Performs the WebSocket handshake and starts the writer task.
pub async fn upgrade(
    stream: TcpStream,
    addr: SocketAddr,
) -> Result<WebSocketConnection, TransportError> {
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(TransportError::Upgrade)?;

    let id = ConnectionId::next();
    tracing::debug!(%id, %addr, "accepted WebSocket connection");

    let (sink, reader) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(id, sink, rx));

    Ok(WebSocketConnection {
        id,
        reader,
        outbox: Outbox {
            id,
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        },
    })
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Outgoing {
    Frame(Vec<u8>),
    Close,
}

/// Queue of frames bound for one connection.
///
/// Cheap to clone; every clone feeds the same writer task and shares one
/// sequence counter, so envelopes to a connection are numbered in the
/// order they are queued. The writer stops once every clone is dropped
/// or [`close`](Self::close) is called.
#[derive(Debug, Clone)]
pub struct Outbox {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Outgoing>,
    seq: Arc<AtomicU64>,
}

impl Outbox {
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Next envelope sequence number for this connection, starting at 0.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Queues one frame. Fails only if the writer has already stopped.
    pub fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(Outgoing::Frame(frame))
            .map_err(|_| TransportError::ConnectionClosed(format!("{} writer stopped", self.id)))
    }

    /// Flushes what is already queued, then sends a Close frame.
    pub fn close(&self) {
        let _ = self.tx.send(Outgoing::Close);
    }
}

async fn write_loop(
    id: ConnectionId,
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Outgoing>,
) {
    while let Some(outgoing) = rx.recv().await {
        let frame = match outgoing {
            Outgoing::Frame(frame) => frame,
            Outgoing::Close => break,
        };
        // JSON goes out as text so browsers get strings, anything else binary.
        let msg = match String::from_utf8(frame) {
            Ok(text) => Message::text(text),
            Err(e) => Message::binary(e.into_bytes()),
        };
        if let Err(e) = sink.send(msg).await {
            tracing::debug!(%id, error = %e, "send failed, stopping writer");
            return;
        }
    }
    if let Err(e) = sink.close().await {
        tracing::debug!(%id, error = %e, "close failed");
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// The read half of a WebSocket connection plus its [`Outbox`].
pub struct WebSocketConnection {
    id: ConnectionId,
    reader: SplitStream<WsStream>,
    outbox: Outbox,
}

impl WebSocketConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Receives the next text or binary frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Ping and
    /// pong frames are skipped.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.reader.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e)),
            }
        }
    }
}
