//! Open games advertised over the lobby channel.

use derive_getters::Getters;
use tracing::{debug, instrument, warn};

/// An open game waiting for a second player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, derive_new::new)]
pub struct LobbyEntry {
    id: String,
}

/// Ordered set of open games, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lobby {
    entries: Vec<LobbyEntry>,
}

impl Lobby {
    /// Creates an empty lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in arrival order.
    pub fn entries(&self) -> &[LobbyEntry] {
        &self.entries
    }

    /// Whether `id` is advertised.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of open games.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no games are open.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a game. Returns false if it was already listed.
    #[instrument(skip(self))]
    pub fn add(&mut self, id: &str) -> bool {
        if self.contains(id) {
            debug!("Game already listed");
            return false;
        }
        self.entries.push(LobbyEntry::new(id.to_string()));
        true
    }

    /// Removes a game. Returns false if it was not listed.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => {
                warn!("Removal for unlisted game ignored");
                false
            }
        }
    }
}
