//! Error types for the session server
//!
//! Transport failures end a session; configuration failures stop the server
//! before it starts accepting connections.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failure of the duplex message channel underneath a session
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("peer channel dropped")]
    ChannelClosed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is already closed")]
    Closed,
    #[error("session has no terminal outcome yet")]
    NotTerminal,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("text corpus contains no phrases")]
    EmptyCorpus,
    #[error("target phrase must not be empty")]
    EmptyPhrase,
    #[error("failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
