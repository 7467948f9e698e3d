//! Lobby channel wire messages.

use derive_more::{Display, Error};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

/// Event pushed by the server over the lobby channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum LobbyEvent {
    /// A game is open for joining.
    #[serde(rename = "add")]
    Added {
        /// Game id.
        #[serde(deserialize_with = "channel_id")]
        id: String,
    },
    /// A game is no longer open.
    #[serde(rename = "remove")]
    Removed {
        /// Game id.
        #[serde(deserialize_with = "channel_id")]
        id: String,
    },
    /// A match was made; `id` is this client's player id.
    #[serde(rename = "startGame")]
    StartGame {
        /// Player id.
        #[serde(deserialize_with = "channel_id")]
        id: String,
    },
    /// The server reported a channel-level problem.
    #[serde(rename = "error")]
    Error {
        /// Server-supplied description.
        #[serde(default)]
        message: Option<String>,
    },
}

impl LobbyEvent {
    /// Parses one text frame.
    ///
    /// A bare `{"error": ...}` object without an `action` tag is accepted as
    /// [`LobbyEvent::Error`].
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, ChannelError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ChannelError::malformed(e.to_string()))?;

        if value.get("action").is_none() {
            if let Some(error) = value.get("error") {
                let message = match error {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Ok(Self::Error {
                    message: Some(message),
                });
            }
        }

        serde_json::from_value(value).map_err(|e| ChannelError::malformed(e.to_string()))
    }
}

/// The single outbound message: register interest in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Register {
    /// Game id (joining) or issued id (creating).
    pub register: String,
}

impl Register {
    /// Encodes the frame text.
    pub fn to_frame(&self) -> String {
        // Serializing a single string field cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"register":"{}"}}"#, self.register))
    }
}

/// Lobby channel failures.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ChannelError {
    /// An inbound frame did not decode into a [`LobbyEvent`].
    #[display("Malformed lobby message: {message}")]
    Malformed {
        /// Decoder error text.
        message: String,
    },
    /// The WebSocket handshake failed.
    #[display("Lobby channel connection failed: {message}")]
    Connect {
        /// Underlying error text.
        message: String,
    },
    /// The channel is closed; nothing can be sent.
    #[display("Lobby channel closed")]
    Closed,
}

impl ChannelError {
    /// Creates a malformed-message error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }
}

fn channel_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected id, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_remove_start() {
        assert_eq!(
            LobbyEvent::parse(r#"{"action":"add","id":"g1"}"#),
            Ok(LobbyEvent::Added { id: "g1".to_string() })
        );
        assert_eq!(
            LobbyEvent::parse(r#"{"action":"remove","id":"g1"}"#),
            Ok(LobbyEvent::Removed { id: "g1".to_string() })
        );
        assert_eq!(
            LobbyEvent::parse(r#"{"action":"startGame","id":"p7"}"#),
            Ok(LobbyEvent::StartGame { id: "p7".to_string() })
        );
    }

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(
            LobbyEvent::parse(r#"{"action":"add","id":12}"#),
            Ok(LobbyEvent::Added { id: "12".to_string() })
        );
    }

    #[test]
    fn test_parse_error_forms() {
        assert_eq!(
            LobbyEvent::parse(r#"{"action":"error"}"#),
            Ok(LobbyEvent::Error { message: None })
        );
        assert_eq!(
            LobbyEvent::parse(r#"{"error":"error"}"#),
            Ok(LobbyEvent::Error {
                message: Some("error".to_string())
            })
        );
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        for text in [
            "not json",
            r#"{"id":"g1"}"#,
            r#"{"action":"explode","id":"g1"}"#,
            r#"{"action":"add"}"#,
            r#"{"action":"add","id":""}"#,
            r#"[1,2,3]"#,
        ] {
            assert!(
                matches!(LobbyEvent::parse(text), Err(ChannelError::Malformed { .. })),
                "{} should be malformed",
                text
            );
        }
    }

    #[test]
    fn test_register_frame() {
        let frame = Register::new("g1".to_string()).to_frame();
        assert_eq!(frame, r#"{"register":"g1"}"#);
    }
}
