//! Transport failure types.

use derive_getters::Getters;
use derive_more::{Display, Error};
use tracing::instrument;

/// A response whose status fell outside the 2xx range.
///
/// The body is kept verbatim so callers can pull a `message` (or `win`)
/// field out of it; no success payload is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, Getters, derive_new::new)]
#[display("HTTP {status} ({status_text})")]
pub struct HttpFailure {
    /// Numeric status code.
    status: u16,
    /// Canonical reason phrase, empty if unknown.
    status_text: String,
    /// Raw response body.
    body: String,
}

impl HttpFailure {
    /// Returns true for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Returns true when the server reports the resource as gone (410).
    pub fn is_gone(&self) -> bool {
        self.status == 410
    }

    /// Extracts the `message` field of a JSON error body.
    #[instrument(skip(self), fields(status = self.status))]
    pub fn message(&self) -> Option<String> {
        self.body_field("message")
    }

    /// Extracts the `win` field of a JSON error body.
    pub fn win(&self) -> Option<String> {
        self.body_field("win")
    }

    fn body_field(&self, field: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        match value.get(field)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Error returned by a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[display("{_0}")]
    Http(HttpFailure),
    /// The request never produced a response (connect, timeout, read).
    #[display("Network error: {message}")]
    Network {
        /// Underlying client error text.
        message: String,
    },
    /// A success body could not be decoded into the expected shape.
    #[display("Invalid response body: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },
}

impl TransportError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns the HTTP failure, if this is one.
    pub fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            Self::Http(failure) => Some(failure),
            _ => None,
        }
    }

    /// A 5xx answer; the long-poll treats these as transient.
    pub fn is_transient(&self) -> bool {
        self.http_failure()
            .is_some_and(HttpFailure::is_server_error)
    }

    /// The server-supplied `message`, if the failure carried one.
    pub fn server_message(&self) -> Option<String> {
        self.http_failure().and_then(HttpFailure::message)
    }
}

impl From<HttpFailure> for TransportError {
    fn from(failure: HttpFailure) -> Self {
        Self::Http(failure)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_range() {
        assert!(HttpFailure::new(500, String::new(), String::new()).is_server_error());
        assert!(HttpFailure::new(503, String::new(), String::new()).is_server_error());
        assert!(!HttpFailure::new(404, String::new(), String::new()).is_server_error());
        assert!(!HttpFailure::new(410, String::new(), String::new()).is_server_error());
    }

    #[test]
    fn test_message_extracted_from_body() {
        let failure = HttpFailure::new(
            400,
            "Bad Request".to_string(),
            r#"{"message":"cell already taken"}"#.to_string(),
        );
        assert_eq!(failure.message().as_deref(), Some("cell already taken"));
        assert_eq!(failure.win(), None);
    }

    #[test]
    fn test_non_json_body_has_no_message() {
        let failure = HttpFailure::new(502, "Bad Gateway".to_string(), "<html>".to_string());
        assert_eq!(failure.message(), None);
    }

    #[test]
    fn test_transient_only_for_http_5xx() {
        let transient: TransportError =
            HttpFailure::new(503, "Service Unavailable".to_string(), String::new()).into();
        assert!(transient.is_transient());
        assert!(!TransportError::network("connection refused").is_transient());
        assert!(!TransportError::decode("eof").is_transient());
    }
}
