//! Per-connection typing session state machine
//!
//! A [`Session`] validates each input snapshot against the target phrase,
//! charges misses against an error budget equal to the phrase length, and
//! produces the messages to push back to the client. It performs no I/O;
//! the caller supplies event timestamps and forwards the returned messages.
//!
//! ```text
//! AwaitingInput --exact match--> Succeeded --finalize--> Closed
//!       |                                                  ^
//!       +--budget exhausted--> Failed ----finalize---------+
//!       +--transport failure (abort) ----------------------+
//! ```

use crate::error::SessionError;
use crate::speed;
use log::{debug, info, warn};
use shared::{InputMessage, Outcome, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Succeeded,
    Failed,
    Closed,
}

#[derive(Debug)]
pub struct Session {
    target: String,
    timestamps: Vec<u64>,
    error_count: usize,
    error_budget: usize,
    succeeded_at_least_once: bool,
    last_speed: Option<u64>,
    outcome: Option<Outcome>,
    state: SessionState,
}

impl Session {
    /// Creates a session for `target` along with the phrase announcement to send first
    pub fn start(target: impl Into<String>) -> (Self, ServerMessage) {
        let target = target.into();
        let error_budget = target.chars().count();
        let announcement = ServerMessage::TextToType(target.clone());

        let session = Self {
            target,
            timestamps: Vec::new(),
            error_count: 0,
            error_budget,
            succeeded_at_least_once: false,
            last_speed: None,
            outcome: None,
            state: SessionState::AwaitingInput,
        };

        (session, announcement)
    }

    /// Consumes one raw input payload received at `timestamp_ns`
    ///
    /// Returns the messages to send, in order. Undecodable payloads produce no
    /// messages and leave the session waiting. When the input ends the session
    /// the finalize messages are appended and the session is closed.
    pub fn on_input(
        &mut self,
        payload: &str,
        timestamp_ns: u64,
    ) -> Result<Vec<ServerMessage>, SessionError> {
        if self.state != SessionState::AwaitingInput {
            return Err(SessionError::Closed);
        }

        self.timestamps.push(timestamp_ns);

        let input = match InputMessage::from_json(payload) {
            Ok(input) => input,
            Err(e) => {
                warn!("Discarding malformed input payload: {}", e);
                return Ok(Vec::new());
            }
        };
        let typed = input.user_input;

        if typed.is_empty() || !self.target.starts_with(typed.as_str()) {
            self.error_count += 1;
            debug!(
                "Input miss {}/{}: {:?}",
                self.error_count, self.error_budget, typed
            );

            if self.error_count >= self.error_budget {
                self.state = SessionState::Failed;
                self.outcome = Some(Outcome::Failed);
                return Ok(self.finalize()?.to_vec());
            }
            return Ok(Vec::new());
        }

        let speed = speed::estimate(&self.timestamps);
        self.last_speed = Some(speed);
        debug!("Measured speed {} after {} events", speed, self.timestamps.len());

        let mut messages = vec![ServerMessage::Speed(speed)];
        if typed == self.target {
            self.state = SessionState::Succeeded;
            self.outcome = Some(Outcome::Succeeded);
            messages.extend(self.finalize()?);
        } else {
            self.succeeded_at_least_once = true;
        }

        Ok(messages)
    }

    /// Emits the verdict followed by the input-clear message and closes the session
    ///
    /// Only valid once, right after the session reached a terminal outcome.
    pub fn finalize(&mut self) -> Result<[ServerMessage; 2], SessionError> {
        let outcome = match self.state {
            SessionState::Succeeded | SessionState::Failed => {
                self.outcome.ok_or(SessionError::NotTerminal)?
            }
            SessionState::AwaitingInput => return Err(SessionError::NotTerminal),
            SessionState::Closed => return Err(SessionError::Closed),
        };

        info!(
            "Session finished: {:?} with {} errors (made progress: {})",
            outcome, self.error_count, self.succeeded_at_least_once
        );
        self.state = SessionState::Closed;

        Ok([ServerMessage::Verdict(outcome), ServerMessage::ClearInput])
    }

    /// Closes the session without a verdict, used when the connection is lost
    pub fn abort(&mut self) {
        if self.state != SessionState::Closed {
            debug!("Session aborted in state {:?}", self.state);
            self.state = SessionState::Closed;
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn error_budget(&self) -> usize {
        self.error_budget
    }

    pub fn succeeded_at_least_once(&self) -> bool {
        self.succeeded_at_least_once
    }

    pub fn last_speed(&self) -> Option<u64> {
        self.last_speed
    }

    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }
}
