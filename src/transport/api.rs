//! Typed calls against the game server's HTTP actions.

use std::sync::Arc;

use reqwest::Method;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use super::{ApiRequest, Endpoint, SessionIds, Transport, TransportError};
use crate::game::Side;

/// Response to `POST newGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    /// Id to register over the lobby channel.
    #[serde(rename = "yourId", deserialize_with = "id_string")]
    pub your_id: String,
}

/// Response to `POST gameReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReady {
    /// Side the server assigned to this player.
    pub side: Side,
}

/// Response to `POST move`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Winner declared by the server, if the move ended the game.
    #[serde(default, deserialize_with = "optional_id_string")]
    pub win: Option<String>,
}

/// Response to `PUT surrender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurrenderAck {
    /// Whether the server accepted the surrender.
    #[serde(default)]
    pub success: bool,
}

/// Raw response of the `GET move` long-poll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
struct PolledMove {
    #[serde(default, rename = "move", deserialize_with = "optional_cell_index")]
    cell: Option<usize>,
    #[serde(default, deserialize_with = "optional_id_string")]
    win: Option<String>,
}

/// What the long-poll reported about the opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentUpdate {
    /// The game is over; carries the server's winner value.
    Won(String),
    /// The opponent claimed the given cell.
    Moved(usize),
}

/// Game server API over any [`Transport`].
#[derive(Debug)]
pub struct GameApi<T> {
    transport: Arc<T>,
}

impl<T> Clone for GameApi<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> GameApi<T> {
    /// Wraps a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Asks the server for a new game id.
    #[instrument(skip(self))]
    pub async fn new_game(&self) -> Result<NewGame, TransportError> {
        let value = self
            .transport
            .send(ApiRequest::new(Method::POST, Endpoint::NewGame))
            .await?;
        let game: NewGame = decode(value)?;
        info!(your_id = %game.your_id, "New game issued");
        Ok(game)
    }

    /// Confirms readiness and learns the assigned side.
    #[instrument(skip(self))]
    pub async fn game_ready(&self, player: &str, game: &str) -> Result<GameReady, TransportError> {
        let request = ApiRequest::new(Method::POST, Endpoint::GameReady)
            .with_body(json!({ "player": player, "game": game }));
        let ready: GameReady = decode(self.transport.send(request).await?)?;
        info!(side = %ready.side, "Side assigned");
        Ok(ready)
    }

    /// Long-polls for the opponent's move.
    ///
    /// Fails with a decode error when the server answers with neither a move
    /// nor a winner.
    #[instrument(skip(self, ids), fields(game_id = %ids.game_id(), player_id = %ids.player_id()))]
    pub async fn poll_move(&self, ids: &SessionIds) -> Result<OpponentUpdate, TransportError> {
        let request = ApiRequest::new(Method::GET, Endpoint::Move).with_ids(ids.clone());
        let polled: PolledMove = decode(self.transport.send(request).await?)?;
        debug!(?polled, "Long-poll answered");
        match polled {
            PolledMove { win: Some(win), .. } => Ok(OpponentUpdate::Won(win)),
            PolledMove { cell: Some(cell), .. } => Ok(OpponentUpdate::Moved(cell)),
            PolledMove { .. } => Err(TransportError::decode(
                "long-poll response carries neither move nor win",
            )),
        }
    }

    /// Submits a move on the given cell.
    #[instrument(skip(self, ids), fields(game_id = %ids.game_id(), player_id = %ids.player_id()))]
    pub async fn submit_move(
        &self,
        ids: &SessionIds,
        cell: usize,
    ) -> Result<MoveOutcome, TransportError> {
        let request = ApiRequest::new(Method::POST, Endpoint::Move)
            .with_ids(ids.clone())
            .with_body(json!({ "move": cell.to_string() }));
        decode(self.transport.send(request).await?)
    }

    /// Gives up the current game.
    #[instrument(skip(self, ids), fields(game_id = %ids.game_id(), player_id = %ids.player_id()))]
    pub async fn surrender(&self, ids: &SessionIds) -> Result<SurrenderAck, TransportError> {
        let request = ApiRequest::new(Method::PUT, Endpoint::Surrender).with_ids(ids.clone());
        decode(self.transport.send(request).await?)
    }
}

fn decode<D: for<'de> Deserialize<'de>>(value: Value) -> Result<D, TransportError> {
    Ok(serde_json::from_value(value)?)
}

/// Ids arrive as strings or bare numbers depending on the server build.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected id, found {}", other))),
    }
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("expected id, found {}", other))),
    }
}

fn optional_cell_index<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<usize>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| de::Error::custom(format!("invalid cell index {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid cell index {:?}", s))),
        other => Err(de::Error::custom(format!("expected cell index, found {}", other))),
    }
}
