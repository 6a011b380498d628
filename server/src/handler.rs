//! Drives one session over one transport from announcement to close

use crate::error::SessionError;
use crate::session::Session;
use crate::text_source::TextSource;
use crate::transport::Transport;
use log::{error, info, warn};
use shared::{Outcome, ServerMessage};
use std::time::{Duration, Instant};

/// Summary of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub phrase: String,
    pub outcome: Option<Outcome>,
    pub error_count: usize,
    pub last_speed: Option<u64>,
    pub events: usize,
}

impl SessionReport {
    fn from_session(session: &Session) -> Self {
        Self {
            phrase: session.target().to_string(),
            outcome: session.outcome(),
            error_count: session.error_count(),
            last_speed: session.last_speed(),
            events: session.timestamps().len(),
        }
    }
}

/// Runs a complete session on `transport`
///
/// Pulls one phrase from `source`, announces it, and then feeds every
/// received message to the session until it closes. A transport failure ends
/// the session immediately without a verdict. With `idle_timeout` set, a
/// client that stays silent that long is disconnected the same way.
pub async fn run_session<T: Transport>(
    transport: &mut T,
    source: &dyn TextSource,
    idle_timeout: Option<Duration>,
) -> Result<SessionReport, SessionError> {
    let (mut session, announcement) = Session::start(source.next_phrase());
    let started_at = Instant::now();

    if let Err(e) = transport.send(announcement.to_html()).await {
        error!("Failed to announce target phrase: {}", e);
        session.abort();
        return Err(e.into());
    }

    loop {
        let received = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, transport.recv()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Session idle for {:?}, disconnecting", limit);
                    session.abort();
                    transport.close().await;
                    return Ok(SessionReport::from_session(&session));
                }
            },
            None => transport.recv().await,
        };

        let payload = match received {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("Client disconnected before the session finished");
                session.abort();
                return Ok(SessionReport::from_session(&session));
            }
            Err(e) => {
                error!("Read error: {}", e);
                session.abort();
                return Err(e.into());
            }
        };

        let timestamp_ns = started_at.elapsed().as_nanos() as u64;
        let messages = session.on_input(&payload, timestamp_ns)?;

        for message in messages {
            if let Err(e) = send_message(transport, &message).await {
                error!("Write error: {}", e);
                session.abort();
                return Err(e);
            }
        }

        if session.is_closed() {
            break;
        }
    }

    transport.close().await;
    Ok(SessionReport::from_session(&session))
}

async fn send_message<T: Transport>(
    transport: &mut T,
    message: &ServerMessage,
) -> Result<(), SessionError> {
    transport.send(message.to_html()).await?;
    Ok(())
}
