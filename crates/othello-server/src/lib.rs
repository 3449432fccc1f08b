//! # Othello server
//!
//! Real-time Othello rooms over WebSocket. Clients create or join rooms,
//! play moves, chat and watch as spectators; every change is pushed to
//! everyone in the room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), othello_server::ServerError> {
//! use othello_server::{OthelloServer, ServerConfig};
//!
//! let server = OthelloServer::builder()
//!     .config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod dispatch;
mod error;
mod handler;
mod server;
mod transport;

pub use config::{DEFAULT_BIND_ADDR, ServerConfig};
pub use error::{ServerError, TransportError};
pub use othello_protocol::PROTOCOL_VERSION;
pub use server::{OthelloServer, OthelloServerBuilder};
