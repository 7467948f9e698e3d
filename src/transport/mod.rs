//! Transport adapter and typed API for the game server.

mod api;
mod endpoint;
mod error;
mod http;
mod request;

pub use api::{GameApi, GameReady, MoveOutcome, NewGame, OpponentUpdate, SurrenderAck};
pub use endpoint::{Endpoint, Endpoints, GAMES_CHANNEL, build_url};
pub use error::{HttpFailure, TransportError};
pub use http::{ReqwestTransport, Transport, parse_body};
pub use request::{ApiRequest, GAME_ID_HEADER, PLAYER_ID_HEADER, SessionIds};
