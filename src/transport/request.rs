//! Request description handed to a transport.

use derive_getters::Getters;
use reqwest::Method;
use serde_json::Value;

use super::Endpoint;

/// Header carrying the game id.
pub const GAME_ID_HEADER: &str = "Game-ID";

/// Header carrying the player id.
pub const PLAYER_ID_HEADER: &str = "Player-ID";

/// The identity pair the server expects on in-game requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, derive_new::new)]
pub struct SessionIds {
    /// Sent as `Game-ID`.
    game_id: String,
    /// Sent as `Player-ID`.
    player_id: String,
}

/// One HTTP call against the game server.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ApiRequest {
    method: Method,
    endpoint: Endpoint,
    body: Option<Value>,
    ids: Option<SessionIds>,
}

impl ApiRequest {
    /// A request without body or session headers.
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            body: None,
            ids: None,
        }
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches the `Game-ID` / `Player-ID` headers.
    pub fn with_ids(mut self, ids: SessionIds) -> Self {
        self.ids = Some(ids);
        self
    }
}
