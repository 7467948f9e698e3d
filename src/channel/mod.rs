//! Lobby channel: server-pushed lobby events and the register message.

mod message;
mod socket;

pub use message::{ChannelError, LobbyEvent, Register};
pub use socket::{ChannelSignal, LobbySender, Registrar, connect};
