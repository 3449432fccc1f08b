//! Server settings.

use std::time::Duration;

/// Address used when nothing else is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

/// Runtime settings for an [`OthelloServer`](crate::OthelloServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to listen on. Port 0 picks a free port.
    pub bind_addr: String,

    /// How long a new connection has to send its `Handshake`.
    pub handshake_timeout: Duration,

    /// A connection that sends nothing for this long is dropped.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            handshake_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `OTHELLO_BIND`,
    /// `OTHELLO_HANDSHAKE_TIMEOUT_SECS` and `OTHELLO_IDLE_TIMEOUT_SECS`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("OTHELLO_BIND") {
            let addr = addr.trim();
            if addr.is_empty() {
                tracing::warn!("OTHELLO_BIND is empty, using {}", config.bind_addr);
            } else {
                config.bind_addr = addr.to_string();
            }
        }
        if let Some(secs) = seconds(&lookup, "OTHELLO_HANDSHAKE_TIMEOUT_SECS") {
            config.handshake_timeout = secs;
        }
        if let Some(secs) = seconds(&lookup, "OTHELLO_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = secs;
        }
        config
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            tracing::warn!(key, "timeout must be positive, ignoring");
            None
        }
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring unparsable timeout");
            None
        }
    }
}
