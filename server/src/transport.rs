//! Duplex message channels that sessions run over
//!
//! The session runner only needs to receive the next text message, send a
//! text message, and close. [`WsTransport`] provides that over a WebSocket;
//! [`ChannelTransport`] provides it in memory.

use crate::error::TransportError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

#[async_trait]
pub trait Transport: Send {
    /// Waits for the next message. `Ok(None)` means the peer closed cleanly.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    async fn close(&mut self);
}

/// WebSocket-backed transport
pub struct WsTransport<S> {
    stream: WebSocketStream<S>,
}

impl<S> WsTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: WebSocketStream<S>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> Transport for WsTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                Message::Binary(data) => {
                    return Ok(Some(String::from_utf8_lossy(&data).into_owned()))
                }
                Message::Close(frame) => {
                    debug!("Peer sent close frame: {:?}", frame);
                    return Ok(None);
                }
                // Pings are answered by tungstenite itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
        Ok(None)
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Error while closing websocket: {}", e);
        }
    }
}

/// In-memory transport over a pair of mpsc channels
pub struct ChannelTransport {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
}

/// The far end of a [`ChannelTransport`], playing the client role
pub struct ChannelPeer {
    pub to_session: mpsc::UnboundedSender<String>,
    pub from_session: mpsc::UnboundedReceiver<String>,
}

impl ChannelTransport {
    pub fn pair() -> (Self, ChannelPeer) {
        let (to_session, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_session) = mpsc::unbounded_channel();

        (
            Self {
                incoming,
                outgoing: Some(outgoing),
            },
            ChannelPeer {
                to_session,
                from_session,
            },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.incoming.recv().await)
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let sender = self.outgoing.as_ref().ok_or(TransportError::Closed)?;
        sender
            .send(text)
            .map_err(|_| TransportError::ChannelClosed)
    }

    async fn close(&mut self) {
        self.outgoing = None;
        self.incoming.close();
    }
}
