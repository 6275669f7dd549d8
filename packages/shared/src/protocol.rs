//! Wire protocol envelopes exchanged over the `/ws` connection.
//!
//! Every envelope is a JSON object tagged by a `"type"` field. A WebSocket text
//! frame carries one or more envelopes separated by `\n`; each envelope this
//! crate encodes is newline-terminated.
//!
//! Client → server:
//!
//! ```text
//! { "type": "join",    "data": "<displayName>" }
//! { "type": "message", "data": "<text>" }
//! ```
//!
//! Server → client:
//!
//! ```text
//! { "type": "message",  "sender": "<name>", "message": "<text>" }
//! { "type": "userList", "message": ["<name>", ...] }
//! { "type": "join",     "userName": "<name>" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Path of the WebSocket endpoint on the chat server.
pub const WS_PATH: &str = "/ws";

const CLIENT_KINDS: &[&str] = &["join", "message"];
const SERVER_KINDS: &[&str] = &["message", "userList", "join"];

/// Errors produced while decoding a single envelope segment.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The segment is not valid JSON or lacks the fields of its kind
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The segment has no string `type` field
    #[error("envelope has no \"type\" field")]
    MissingKind,

    /// The `type` field names a kind this side does not understand
    #[error("unknown envelope type '{0}'")]
    UnknownKind(String),

    /// A `message` envelope arrived without a sender name
    #[error("message envelope has an empty sender")]
    EmptySender,
}

/// Envelope sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientEnvelope {
    /// Announces the display name of the connection. Always the first envelope.
    Join(String),
    /// Chat text; the server attributes the sender from the connection.
    Message(String),
}

impl ClientEnvelope {
    /// Serialize as a newline-terminated line.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        encode_line(self)
    }

    /// Decode a single segment received from a client.
    pub fn decode(segment: &str) -> Result<Self, DecodeError> {
        let value = parse_tagged(segment, CLIENT_KINDS)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Envelope pushed from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEnvelope {
    /// A chat message attributed to `sender`
    #[serde(rename = "message")]
    Message { sender: String, message: String },

    /// Full snapshot of the names currently in the chat
    #[serde(rename = "userList")]
    UserList { message: Vec<String> },

    /// Someone joined the chat
    #[serde(rename = "join")]
    Join {
        #[serde(rename = "userName")]
        user_name: String,
    },
}

impl ServerEnvelope {
    /// Serialize as a newline-terminated line.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        encode_line(self)
    }

    /// Decode a single segment received from the server.
    pub fn decode(segment: &str) -> Result<Self, DecodeError> {
        let value = parse_tagged(segment, SERVER_KINDS)?;
        let envelope: Self = serde_json::from_value(value)?;

        if let Self::Message { sender, .. } = &envelope
            && sender.is_empty()
        {
            return Err(DecodeError::EmptySender);
        }

        Ok(envelope)
    }
}

/// Split a raw text frame into envelope-sized segments.
///
/// Segments are separated by `\n`; surrounding whitespace (including `\r`) is
/// trimmed and blank segments are skipped.
pub fn split_segments(frame: &str) -> impl Iterator<Item = &str> {
    frame
        .split('\n')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

fn encode_line<T: Serialize>(envelope: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(envelope)?;
    line.push('\n');
    Ok(line)
}

fn parse_tagged(segment: &str, known_kinds: &[&str]) -> Result<Value, DecodeError> {
    let value: Value = serde_json::from_str(segment)?;

    match value.get("type").and_then(Value::as_str) {
        None => return Err(DecodeError::MissingKind),
        Some(kind) if !known_kinds.contains(&kind) => {
            return Err(DecodeError::UnknownKind(kind.to_string()));
        }
        Some(_) => {}
    }

    Ok(value)
}
