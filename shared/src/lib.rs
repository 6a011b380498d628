use serde::{Deserialize, Serialize};
use std::fmt;

pub const WS_PATH: &str = "/ws";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://127.0.0.1:8080";

pub const SUCCESS_TEXT: &str = "You did it, congrats!";
pub const FAILURE_TEXT: &str = "You did too much errors, try again!";

pub const TEXT_TO_TYPE_ID: &str = "textToType";
pub const SPEED_ID: &str = "speed";
pub const CONGRATS_ID: &str = "congrats";
pub const TEXT_INPUT_ID: &str = "textInput";

/// Snapshot of the client's whole input field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct InputMessage {
    #[serde(rename = "userInput", default)]
    pub user_input: String,
}

impl InputMessage {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn to_json(&self) -> String {
        // A struct with a single string field always serializes
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    pub fn verdict_text(self) -> &'static str {
        match self {
            Outcome::Succeeded => SUCCESS_TEXT,
            Outcome::Failed => FAILURE_TEXT,
        }
    }
}

/// Messages pushed from the server, each rendered as an out-of-band swap fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    TextToType(String),
    Speed(u64),
    Verdict(Outcome),
    ClearInput,
}

impl ServerMessage {
    pub fn to_html(&self) -> String {
        self.to_string()
    }

    /// Recognizes a fragment produced by [`ServerMessage::to_html`].
    pub fn parse(fragment: &str) -> Option<Self> {
        let (id, body) = split_fragment(fragment)?;
        match id {
            TEXT_TO_TYPE_ID => Some(ServerMessage::TextToType(unescape_html(body))),
            SPEED_ID => body.trim().parse().ok().map(ServerMessage::Speed),
            CONGRATS_ID => match body {
                SUCCESS_TEXT => Some(ServerMessage::Verdict(Outcome::Succeeded)),
                FAILURE_TEXT => Some(ServerMessage::Verdict(Outcome::Failed)),
                _ => None,
            },
            TEXT_INPUT_ID if body.is_empty() => Some(ServerMessage::ClearInput),
            _ => None,
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::TextToType(phrase) => write!(
                f,
                "<div id=\"{}\" hx-swap-oob=\"true\">{}</div>",
                TEXT_TO_TYPE_ID,
                escape_html(phrase)
            ),
            ServerMessage::Speed(speed) => write!(
                f,
                "<span id=\"{}\" hx-swap-oob=\"true\">{}</span>",
                SPEED_ID, speed
            ),
            ServerMessage::Verdict(outcome) => write!(
                f,
                "<span id=\"{}\" hx-swap-oob=\"true\">{}</span>",
                CONGRATS_ID,
                outcome.verdict_text()
            ),
            ServerMessage::ClearInput => {
                write!(f, "<div id=\"{}\" hx-swap-oob=\"true\"></div>", TEXT_INPUT_ID)
            }
        }
    }
}

/// Splits one of our own fragments into its element id and inner text
fn split_fragment(fragment: &str) -> Option<(&str, &str)> {
    let rest = fragment.trim().strip_prefix('<')?;
    let id_start = rest.find("id=\"")? + 4;
    let id_len = rest[id_start..].find('"')?;
    let id = &rest[id_start..id_start + id_len];
    let body_start = rest.find('>')? + 1;
    let body_end = rest.rfind("</")?;
    if body_end < body_start {
        return None;
    }
    Some((id, &rest[body_start..body_end]))
}

/// Escapes the phrase for the announcement fragment; not a general HTML escaper
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverses [`escape_html`] when decoding fragments in [`ServerMessage::parse`]
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
