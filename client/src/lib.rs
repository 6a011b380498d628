//! # Typing Client Library
//!
//! A scripted typist for the typing session server. It connects over a
//! WebSocket, waits for the phrase announcement, and sends one snapshot of
//! its simulated input field per keystroke while collecting the speed
//! updates and the final verdict.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Turns a phrase into input-field snapshots, optionally with typos that get
//! corrected on the next keystroke.
//!
//! ### Network Module (`network`)
//! Opens the session with the expected `Origin` header, types in a
//! background task, and decodes the server's HTML fragments.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect(
//!         "ws://127.0.0.1:8080/ws",
//!         "http://127.0.0.1:8080",
//!         Duration::from_millis(120),
//!         0.05,
//!     )
//!     .await?;
//!
//!     let summary = client.run().await?;
//!     println!("{:?}", summary.outcome);
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;
