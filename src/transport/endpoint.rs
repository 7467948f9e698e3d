//! Server endpoint addressing.

use derive_getters::Getters;
use tracing::instrument;

/// HTTP actions exposed by the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Endpoint {
    /// `POST newGame`
    #[strum(serialize = "newGame")]
    NewGame,
    /// `POST gameReady`
    #[strum(serialize = "gameReady")]
    GameReady,
    /// `GET move` (long-poll) and `POST move`
    #[strum(serialize = "move")]
    Move,
    /// `PUT surrender`
    #[strum(serialize = "surrender")]
    Surrender,
}

/// Path of the lobby WebSocket channel.
pub const GAMES_CHANNEL: &str = "games";

/// Builds URLs for one server host.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Endpoints {
    /// Host (and optional port) of the game server.
    host: String,
    /// Whether to use `https`/`wss`.
    tls: bool,
}

impl Endpoints {
    /// Creates endpoints for the given host.
    #[instrument]
    pub fn new(host: String, tls: bool) -> Self {
        let host = host.trim_end_matches('/').to_string();
        Self { host, tls }
    }

    /// URL of an HTTP action.
    pub fn url(&self, endpoint: Endpoint) -> String {
        build_url(self.http_scheme(), &self.host, &endpoint.to_string())
    }

    /// URL of the lobby channel.
    pub fn games_channel(&self) -> String {
        build_url(self.ws_scheme(), &self.host, GAMES_CHANNEL)
    }

    fn http_scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }

    fn ws_scheme(&self) -> &'static str {
        if self.tls { "wss" } else { "ws" }
    }
}

/// Joins `scheme://base/action`.
pub fn build_url(scheme: &str, base: &str, action: &str) -> String {
    format!("{}://{}/{}", scheme, base, action)
}
