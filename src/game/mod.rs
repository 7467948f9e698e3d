//! Client-side game session: data model, state machine and opponent poller.

mod board;
mod display;
mod lobby;
mod machine;
mod poller;
mod session;

pub use board::{Battlefield, BoardError, Cell, FIELD_COLS, FIELD_ROWS, FIRST_CELL};
pub use display::{ActionButton, ActionLabel, Banner, Tone};
pub use lobby::{Lobby, LobbyEntry};
pub use machine::{
    ApiCall, Command, Completion, GameMachine, Input, Outcome, Pending, Phase, Rejection,
    UserAction,
};
pub use poller::{PollPolicy, await_opponent_move};
pub use session::{Session, Side};
