//! Strictly XO library - client for networked 10x10 tic-tac-toe
//!
//! This library speaks to an XO game server: it creates and joins games over
//! HTTP, follows the lobby over a WebSocket channel, and keeps the client's
//! view of a match in a pure state machine.
//!
//! # Architecture
//!
//! - **Transport**: HTTP endpoints (`newGame`, `gameReady`, `move`, `surrender`)
//! - **Channel**: WebSocket lobby feed and `register` frames
//! - **Game**: Session data, battlefield, lobby list and the state machine
//! - **Driver**: Runs machine commands against the network
//!
//! # Example
//!
//! ```no_run
//! use strictly_xo::{ClientConfig, GameApi, ReqwestTransport, SessionDriver, UserAction, connect};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let endpoints = config.endpoints();
//! let transport = ReqwestTransport::new(endpoints.clone(), config.request_timeout())?;
//! let (sender, signals) = connect(&endpoints.games_channel()).await?;
//!
//! let mut driver = SessionDriver::new(GameApi::new(transport), sender, signals, config.poll_policy());
//! driver.act(UserAction::CreateGame)?;
//! while driver.next_event().await {}
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod channel;
mod config;
mod driver;
mod game;
mod transport;

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, DEFAULT_HOST, HOST_ENV};

// Crate-level exports - Session driver
pub use driver::SessionDriver;

// Crate-level exports - Lobby channel
pub use channel::{ChannelError, ChannelSignal, LobbyEvent, LobbySender, Register, Registrar, connect};

// Crate-level exports - Game state
pub use game::{
    ActionButton, ActionLabel, ApiCall, Banner, Battlefield, BoardError, Cell, Command, Completion,
    FIELD_COLS, FIELD_ROWS, FIRST_CELL, GameMachine, Input, Lobby, LobbyEntry, Outcome, Pending,
    Phase, PollPolicy, Rejection, Session, Side, Tone, UserAction, await_opponent_move,
};

// Crate-level exports - HTTP transport
pub use transport::{
    ApiRequest, Endpoint, Endpoints, GAME_ID_HEADER, GAMES_CHANNEL, GameApi, GameReady,
    HttpFailure, MoveOutcome, NewGame, OpponentUpdate, PLAYER_ID_HEADER, ReqwestTransport,
    SessionIds, SurrenderAck, Transport, TransportError, build_url, parse_body,
};
