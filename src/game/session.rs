//! Per-client session identity and turn state.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::transport::SessionIds;

/// A player's marker for a match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// Moves first.
    X,
    /// Moves second.
    O,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    /// Whether this side opens the match.
    pub fn moves_first(self) -> bool {
        self == Side::X
    }
}

/// This client's view of the current game.
///
/// A fresh session is all-empty. Every change produces a new value; the
/// state machine swaps it in wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Session {
    game_id: String,
    player_id: String,
    player_side: Option<Side>,
    competitor_side: Option<Side>,
    is_my_turn: bool,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session with the game id set.
    #[instrument(skip(self))]
    pub fn with_game_id(self, game_id: String) -> Self {
        Self { game_id, ..self }
    }

    /// Returns the session with the player id set.
    #[instrument(skip(self))]
    pub fn with_player_id(self, player_id: String) -> Self {
        Self { player_id, ..self }
    }

    /// Returns the session with sides assigned from the server's answer.
    ///
    /// The first mover starts with the turn.
    #[instrument(skip(self))]
    pub fn with_side(self, side: Side) -> Self {
        debug!(competitor = %side.opponent(), "Assigning sides");
        Self {
            player_side: Some(side),
            competitor_side: Some(side.opponent()),
            is_my_turn: side.moves_first(),
            ..self
        }
    }

    /// Returns the session with the turn handed to the other side.
    pub fn with_turn_passed(self) -> Self {
        Self {
            is_my_turn: !self.is_my_turn,
            ..self
        }
    }

    /// Side whose turn it is, once sides are assigned.
    pub fn side_to_move(&self) -> Option<Side> {
        if self.is_my_turn {
            self.player_side
        } else {
            self.competitor_side
        }
    }

    /// Header pair for in-game requests.
    pub fn ids(&self) -> SessionIds {
        SessionIds::new(self.game_id.clone(), self.player_id.clone())
    }
}
