//! # Typing Session Server Library
//!
//! This library provides the server side of a typing-practice service. A
//! browser (or any other client) opens a WebSocket, receives a phrase to
//! type, and streams snapshots of its input field back. The server checks
//! every snapshot, reports a running typing speed, and ends the session with
//! a verdict.
//!
//! ## Core Responsibilities
//!
//! ### Prefix Validation
//! Each snapshot is the client's full input buffer, not a single keystroke.
//! A snapshot is valid while the target phrase starts with it. Invalid or
//! empty snapshots are charged against an error budget equal to the phrase
//! length. Since the whole buffer is revalidated every time, a user who
//! deletes a typo and continues simply becomes valid again.
//!
//! ### Speed Reporting
//! Every valid snapshot triggers a speed update computed from the arrival
//! times of all events seen so far (see [`speed::estimate`]).
//!
//! ### Session Termination
//! Typing the phrase exactly ends the session with success; exhausting the
//! error budget ends it with failure. Either way the client receives one
//! verdict followed by an instruction to clear its input field. Losing the
//! connection ends the session silently.
//!
//! ## Architecture Design
//!
//! ### One Task Per Connection
//! Every accepted connection runs in its own tokio task that owns its
//! [`session::Session`] outright. Sessions never share state, so no locks
//! are involved beyond the internally synchronized [`text_source::TextSource`].
//!
//! ### I/O-Free State Machine
//! [`session::Session`] only maps inputs to outgoing messages. The
//! [`handler::run_session`] loop moves messages between it and a
//! [`transport::Transport`], which keeps the state machine testable without
//! sockets.
//!
//! ## Module Organization
//!
//! - `config`: listener address, upgrade path, allowed origin, idle deadline
//! - `error`: transport, session, configuration and server errors
//! - `handler`: the per-connection receive/process/send loop
//! - `network`: TCP accept loop and WebSocket upgrade with origin checking
//! - `session`: the session state machine
//! - `speed`: typing speed estimation
//! - `text_source`: fixed and random target phrase providers
//! - `transport`: WebSocket and in-memory message channels
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::SessionServer;
//! use server::text_source::RandomText;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new("127.0.0.1", 8080);
//!     let server = SessionServer::bind(config, Arc::new(RandomText::with_default_corpus())).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod network;
pub mod session;
pub mod speed;
pub mod text_source;
pub mod transport;
