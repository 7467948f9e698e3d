//! Game session state machine.
//!
//! The machine is pure: [`GameMachine::handle`] consumes one [`Input`] and
//! returns the [`Command`]s the caller must execute. Request completions come
//! back as [`Input::Completed`], tagged with the epoch they were issued under
//! so that answers belonging to an abandoned session are dropped.
//!
//! ```text
//! Idle -> InLobby -> AwaitingMatch -> MyTurn <-> OpponentTurn -> Finished -> InLobby
//! ```

use derive_getters::Getters;
use derive_more::{Display, Error};
use tracing::{debug, error, info, instrument, warn};

use super::{ActionButton, ActionLabel, Banner, Battlefield, Lobby, Session, Side};
use crate::channel::LobbyEvent;
use crate::transport::{
    GameReady, MoveOutcome, NewGame, OpponentUpdate, SessionIds, SurrenderAck, TransportError,
};

const WAITING_FOR_START: &str = "Waiting for the game to start...";
const CREATE_FAILED: &str = "Game creation failed";
const START_FAILED: &str = "Game start failed: unknown error";
const OPPONENT_TIMED_OUT: &str = "Game start failed: the other player did not respond";
const MOVE_FAILED: &str = "Move failed: unknown error";
const WAIT_FAILED: &str = "Waiting for the opponent failed: unknown error";
const SURRENDER_FAILED: &str = "Surrender failed: unknown error";
const SURRENDER_REFUSED: &str = "Surrender was not accepted";

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Phase {
    /// Lobby channel not connected yet.
    #[default]
    Idle,
    /// Browsing or creating games.
    InLobby,
    /// Registered for a game, waiting for `startGame`.
    AwaitingMatch,
    /// This client moves next.
    MyTurn,
    /// Waiting on the opponent's move.
    OpponentTurn,
    /// The game ended; the result stays on screen.
    Finished,
}

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Create a new game.
    CreateGame,
    /// Join an advertised game.
    JoinGame {
        /// Lobby entry id.
        game_id: String,
    },
    /// Claim a battlefield cell.
    ClaimCell {
        /// Cell index.
        index: usize,
    },
    /// Give up.
    Surrender,
    /// Return to the lobby after a game ended.
    NewGame,
    /// Press the action button, whatever it currently says.
    PressAction,
}

/// Result of a request, as reported back to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `POST newGame` finished.
    GameCreated(Result<NewGame, TransportError>),
    /// `POST gameReady` finished.
    GameReady(Result<GameReady, TransportError>),
    /// `POST move` finished.
    MoveSubmitted {
        /// Cell that was submitted.
        index: usize,
        /// Server answer.
        result: Result<MoveOutcome, TransportError>,
    },
    /// The long-poll finished.
    OpponentMoved(Result<OpponentUpdate, TransportError>),
    /// `PUT surrender` finished.
    Surrendered(Result<SurrenderAck, TransportError>),
}

/// A request outcome tagged with the epoch it was issued under.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct Completion {
    epoch: u64,
    outcome: Outcome,
}

impl Completion {
    /// Splits into epoch and outcome.
    pub fn into_parts(self) -> (u64, Outcome) {
        (self.epoch, self.outcome)
    }
}

/// Everything that can drive the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The lobby channel is up.
    ChannelConnected,
    /// The lobby channel went away.
    ChannelClosed {
        /// Why it closed.
        reason: String,
    },
    /// A lobby channel event.
    Lobby(LobbyEvent),
    /// A user action.
    User(UserAction),
    /// A request finished.
    Completed(Completion),
}

/// A server call the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `POST newGame`
    NewGame,
    /// `POST gameReady`
    GameReady {
        /// Player id from `startGame`.
        player: String,
        /// Game id registered earlier.
        game: String,
    },
    /// `POST move`
    SubmitMove {
        /// Session headers.
        ids: SessionIds,
        /// Cell to claim.
        index: usize,
    },
    /// `GET move`, retried on 5xx by the poller.
    AwaitOpponent {
        /// Session headers.
        ids: SessionIds,
    },
    /// `PUT surrender`
    Surrender {
        /// Session headers.
        ids: SessionIds,
    },
}

impl ApiCall {
    /// Whether the call changes server state.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, ApiCall::AwaitOpponent { .. })
    }
}

/// Side effect requested by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send `{"register": id}` over the lobby channel.
    Register {
        /// Id to register.
        id: String,
    },
    /// Perform an HTTP call and report back with the same epoch.
    Request {
        /// Epoch the call belongs to.
        epoch: u64,
        /// What to call.
        call: ApiCall,
    },
}

/// Mutating request currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Pending {
    /// `POST newGame`
    CreateGame,
    /// `POST gameReady`
    GameReady,
    /// `POST move`
    Move {
        /// Submitted cell.
        index: usize,
    },
    /// `PUT surrender`
    Surrender,
}

/// Why a user action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Rejection {
    /// Another mutating request has not finished yet.
    #[display("A {pending} request is still in flight")]
    RequestPending {
        /// The request in flight.
        pending: Pending,
    },
    /// The action makes no sense in the current phase.
    #[display("{action} is not available while {phase}")]
    NotAllowed {
        /// Refused action.
        action: &'static str,
        /// Current phase.
        phase: Phase,
    },
    /// The action button is disabled.
    #[display("The action button is disabled")]
    ButtonDisabled,
    /// The cell is claimed or does not exist.
    #[display("Cell {index} cannot be claimed")]
    CellUnavailable {
        /// Requested cell.
        index: usize,
    },
    /// The game is the one this client advertised.
    #[display("Cannot join your own game")]
    OwnGame,
    /// The game is not (or no longer) in the lobby.
    #[display("Game {id} is not open")]
    UnknownGame {
        /// Requested game.
        id: String,
    },
    /// The lobby channel is gone; registering is impossible.
    #[display("The lobby channel is closed")]
    ChannelClosed,
}

/// The client's game session state machine.
#[derive(Debug, Clone, Getters)]
pub struct GameMachine {
    phase: Phase,
    session: Session,
    lobby: Lobby,
    /// Game this client created, until the lobby drops it.
    advertised: Option<String>,
    battlefield: Option<Battlefield>,
    banner: Banner,
    button: ActionButton,
    pending: Option<Pending>,
    polling: bool,
    channel_open: bool,
    epoch: u64,
}

impl Default for GameMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMachine {
    /// Creates an idle machine with an empty session.
    #[instrument]
    pub fn new() -> Self {
        let mut button = ActionButton::default();
        button.disable();
        Self {
            phase: Phase::Idle,
            session: Session::new(),
            lobby: Lobby::new(),
            advertised: None,
            battlefield: None,
            banner: Banner::neutral(),
            button,
            pending: None,
            polling: false,
            channel_open: false,
            epoch: 0,
        }
    }

    /// Feeds one input and returns the commands to execute.
    ///
    /// Only user actions can be rejected; channel events and completions that
    /// do not apply are logged and yield no commands.
    #[instrument(skip(self, input), fields(phase = %self.phase, epoch = self.epoch))]
    pub fn handle(&mut self, input: Input) -> Result<Vec<Command>, Rejection> {
        let before = self.phase;
        let result = match input {
            Input::ChannelConnected => Ok(self.on_connected()),
            Input::ChannelClosed { reason } => Ok(self.on_channel_closed(reason)),
            Input::Lobby(event) => Ok(self.on_lobby_event(event)),
            Input::User(action) => self.on_user_action(action),
            Input::Completed(completion) => Ok(self.on_completion(completion)),
        };
        if before != self.phase {
            info!(from = %before, to = %self.phase, "Phase changed");
        }
        result
    }

    fn on_connected(&mut self) -> Vec<Command> {
        self.channel_open = true;
        if self.phase == Phase::Idle {
            self.enter_lobby();
        }
        Vec::new()
    }

    fn on_channel_closed(&mut self, reason: String) -> Vec<Command> {
        error!(reason = %reason, "Lobby channel lost");
        self.channel_open = false;
        let text = format!("Lobby connection lost: {}", reason);
        match self.phase {
            Phase::AwaitingMatch if self.pending.is_none() => self.fail_to_lobby(text),
            _ => self.banner = Banner::error(text),
        }
        Vec::new()
    }

    fn on_lobby_event(&mut self, event: LobbyEvent) -> Vec<Command> {
        match event {
            LobbyEvent::Added { id } => {
                if self.lobby.add(&id) {
                    info!(game_id = %id, "Game opened");
                }
                Vec::new()
            }
            LobbyEvent::Removed { id } => {
                if self.lobby.remove(&id) {
                    info!(game_id = %id, "Game closed");
                }
                if self.advertised.as_deref() == Some(id.as_str()) {
                    self.advertised = None;
                }
                Vec::new()
            }
            LobbyEvent::StartGame { id } => self.on_start_game(id),
            LobbyEvent::Error { message } => {
                warn!(message = ?message, "Lobby channel reported an error");
                Vec::new()
            }
        }
    }

    fn on_start_game(&mut self, player_id: String) -> Vec<Command> {
        if !matches!(self.phase, Phase::InLobby | Phase::AwaitingMatch) {
            warn!(player_id = %player_id, "startGame outside the lobby ignored");
            return Vec::new();
        }
        if let Some(pending) = self.pending {
            warn!(player_id = %player_id, %pending, "startGame while a request is in flight ignored");
            return Vec::new();
        }

        info!(player_id = %player_id, game_id = %self.session.game_id(), "Match starting");
        self.session = std::mem::take(&mut self.session).with_player_id(player_id);
        self.pending = Some(Pending::GameReady);
        self.banner = Banner::message(WAITING_FOR_START);
        self.button.disable();
        vec![self.request(ApiCall::GameReady {
            player: self.session.player_id().clone(),
            game: self.session.game_id().clone(),
        })]
    }

    fn on_user_action(&mut self, action: UserAction) -> Result<Vec<Command>, Rejection> {
        debug!(?action, "User action");
        match action {
            UserAction::PressAction => {
                if !self.button.enabled() {
                    return Err(Rejection::ButtonDisabled);
                }
                match self.button.label() {
                    ActionLabel::CreateGame => self.create_game(),
                    ActionLabel::Surrender => self.surrender(),
                    ActionLabel::NewGame => self.new_game(),
                }
            }
            UserAction::CreateGame => self.create_game(),
            UserAction::JoinGame { game_id } => self.join_game(game_id),
            UserAction::ClaimCell { index } => self.claim_cell(index),
            UserAction::Surrender => self.surrender(),
            UserAction::NewGame => self.new_game(),
        }
    }

    fn create_game(&mut self) -> Result<Vec<Command>, Rejection> {
        self.require_phase("Create game", &[Phase::InLobby])?;
        self.require_idle()?;
        self.require_channel()?;

        self.pending = Some(Pending::CreateGame);
        self.banner = Banner::message("Creating a game...");
        self.button.disable();
        Ok(vec![self.request(ApiCall::NewGame)])
    }

    fn join_game(&mut self, game_id: String) -> Result<Vec<Command>, Rejection> {
        self.require_phase("Join game", &[Phase::InLobby])?;
        self.require_idle()?;
        self.require_channel()?;
        if self.advertised.as_deref() == Some(game_id.as_str()) {
            return Err(Rejection::OwnGame);
        }
        if !self.lobby.contains(&game_id) {
            return Err(Rejection::UnknownGame { id: game_id });
        }

        info!(game_id = %game_id, "Joining game");
        self.session = Session::new().with_game_id(game_id.clone());
        self.phase = Phase::AwaitingMatch;
        self.banner = Banner::message(format!("Joining game {}...", game_id));
        self.button.relabel(ActionLabel::Surrender);
        Ok(vec![Command::Register { id: game_id }])
    }

    fn claim_cell(&mut self, index: usize) -> Result<Vec<Command>, Rejection> {
        self.require_phase("Move", &[Phase::MyTurn])?;
        self.require_idle()?;
        let free = self
            .battlefield
            .as_ref()
            .is_some_and(|field| field.is_free(index));
        if !free || !self.session.is_my_turn() {
            return Err(Rejection::CellUnavailable { index });
        }

        info!(index, "Submitting move");
        self.pending = Some(Pending::Move { index });
        self.button.disable();
        Ok(vec![self.request(ApiCall::SubmitMove {
            ids: self.session.ids(),
            index,
        })])
    }

    fn surrender(&mut self) -> Result<Vec<Command>, Rejection> {
        self.require_phase(
            "Surrender",
            &[Phase::MyTurn, Phase::OpponentTurn, Phase::AwaitingMatch],
        )?;
        self.require_idle()?;

        info!("Surrendering");
        self.pending = Some(Pending::Surrender);
        self.button.disable();
        Ok(vec![self.request(ApiCall::Surrender {
            ids: self.session.ids(),
        })])
    }

    fn new_game(&mut self) -> Result<Vec<Command>, Rejection> {
        self.require_phase("New game", &[Phase::Finished])?;
        self.enter_lobby();
        Ok(Vec::new())
    }

    fn on_completion(&mut self, completion: Completion) -> Vec<Command> {
        let (epoch, outcome) = completion.into_parts();
        if epoch != self.epoch {
            warn!(stale_epoch = epoch, ?outcome, "Dropping response for an abandoned session");
            return Vec::new();
        }

        match outcome {
            Outcome::GameCreated(result) => self.on_game_created(result),
            Outcome::GameReady(result) => self.on_game_ready(result),
            Outcome::MoveSubmitted { index, result } => self.on_move_submitted(index, result),
            Outcome::OpponentMoved(result) => self.on_opponent_moved(result),
            Outcome::Surrendered(result) => self.on_surrendered(result),
        }
    }

    fn on_game_created(&mut self, result: Result<NewGame, TransportError>) -> Vec<Command> {
        if !self.settle(Pending::CreateGame) {
            return Vec::new();
        }
        match result {
            Ok(game) => {
                let id = game.your_id;
                info!(game_id = %id, "Game created, registering");
                self.session = Session::new().with_game_id(id.clone());
                self.advertised = Some(id.clone());
                self.phase = Phase::AwaitingMatch;
                self.banner = Banner::message(format!("Game {} created, waiting for an opponent...", id));
                self.button.relabel(ActionLabel::Surrender);
                vec![Command::Register { id }]
            }
            Err(e) => {
                warn!(error = %e, "Game creation failed");
                self.fail_to_lobby(CREATE_FAILED);
                Vec::new()
            }
        }
    }

    fn on_game_ready(&mut self, result: Result<GameReady, TransportError>) -> Vec<Command> {
        if !self.settle(Pending::GameReady) {
            return Vec::new();
        }
        let side = match result {
            Ok(ready) => ready.side,
            Err(e) => {
                warn!(error = %e, "gameReady failed");
                let gone = e.http_failure().is_some_and(|f| f.is_gone());
                self.fail_to_lobby(if gone { OPPONENT_TIMED_OUT } else { START_FAILED });
                return Vec::new();
            }
        };

        self.session = std::mem::take(&mut self.session).with_side(side);
        self.battlefield = Some(Battlefield::new());
        self.button.relabel(ActionLabel::Surrender);
        if side.moves_first() {
            self.phase = Phase::MyTurn;
            self.banner = your_move(side);
            Vec::new()
        } else {
            self.phase = Phase::OpponentTurn;
            self.banner = wait_for_opponent(side);
            self.start_polling()
        }
    }

    fn on_move_submitted(
        &mut self,
        index: usize,
        result: Result<MoveOutcome, TransportError>,
    ) -> Vec<Command> {
        if !self.settle(Pending::Move { index }) {
            return Vec::new();
        }
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, index, "Move failed");
                let failure = e.http_failure();
                match (
                    failure.and_then(|f| f.message()),
                    failure.and_then(|f| f.win()),
                ) {
                    (Some(message), _) => self.stop_game(Banner::error(message)),
                    (None, Some(win)) => self.stop_game(Banner::message(win)),
                    (None, None) => self.stop_game(Banner::error(MOVE_FAILED)),
                }
                return Vec::new();
            }
        };

        let Some(side) = *self.session.player_side() else {
            error!(index, "Move accepted without an assigned side");
            self.stop_game(Banner::error(MOVE_FAILED));
            return Vec::new();
        };
        if let Err(e) = self.claim(index, side) {
            error!(error = %e, "Own move could not be applied");
            self.stop_game(Banner::error(e.to_string()));
            return Vec::new();
        }
        self.session = std::mem::take(&mut self.session).with_turn_passed();

        match outcome.win {
            Some(win) => {
                info!(winner = %win, "Game won");
                self.stop_game(Banner::message(win));
                Vec::new()
            }
            None => {
                self.phase = Phase::OpponentTurn;
                self.banner = wait_for_opponent(side);
                self.button.relabel(ActionLabel::Surrender);
                self.start_polling()
            }
        }
    }

    fn on_opponent_moved(&mut self, result: Result<OpponentUpdate, TransportError>) -> Vec<Command> {
        if !self.polling || self.phase != Phase::OpponentTurn {
            warn!(phase = %self.phase, "Unexpected long-poll answer ignored");
            return Vec::new();
        }
        self.polling = false;

        if self.pending == Some(Pending::Surrender) {
            info!(?result, "Long-poll answered during surrender, leaving the outcome to it");
            return Vec::new();
        }

        match result {
            Ok(OpponentUpdate::Won(win)) => {
                info!(winner = %win, "Game over");
                self.stop_game(Banner::message(win));
            }
            Ok(OpponentUpdate::Moved(index)) => {
                let (Some(competitor), Some(side)) =
                    (*self.session.competitor_side(), *self.session.player_side())
                else {
                    error!(index, "Opponent move without assigned sides");
                    self.stop_game(Banner::error(WAIT_FAILED));
                    return Vec::new();
                };
                if let Err(e) = self.claim(index, competitor) {
                    error!(error = %e, "Opponent move names an unusable cell");
                    self.stop_game(Banner::error(e.to_string()));
                    return Vec::new();
                }
                info!(index, "Opponent moved");
                self.session = std::mem::take(&mut self.session).with_turn_passed();
                self.phase = Phase::MyTurn;
                self.banner = your_move(side);
            }
            Err(e) => {
                warn!(error = %e, "Waiting for the opponent failed");
                let text = e.server_message().unwrap_or_else(|| WAIT_FAILED.to_string());
                self.stop_game(Banner::error(text));
            }
        }
        Vec::new()
    }

    fn on_surrendered(&mut self, result: Result<SurrenderAck, TransportError>) -> Vec<Command> {
        if !self.settle(Pending::Surrender) {
            return Vec::new();
        }
        match result {
            Ok(SurrenderAck { success: true }) => {
                info!("Surrender accepted");
                self.enter_lobby();
            }
            Ok(SurrenderAck { success: false }) => {
                warn!("Surrender refused by server");
                self.fail_to_lobby(SURRENDER_REFUSED);
            }
            Err(e) => {
                warn!(error = %e, "Surrender failed");
                let text = e
                    .server_message()
                    .unwrap_or_else(|| SURRENDER_FAILED.to_string());
                self.fail_to_lobby(text);
            }
        }
        Vec::new()
    }

    fn claim(&mut self, index: usize, side: Side) -> Result<(), super::BoardError> {
        match self.battlefield.as_mut() {
            Some(field) => field.claim(index, side),
            None => Err(super::BoardError::CellNotFound { index }),
        }
    }

    fn start_polling(&mut self) -> Vec<Command> {
        self.polling = true;
        vec![self.request(ApiCall::AwaitOpponent {
            ids: self.session.ids(),
        })]
    }

    fn request(&self, call: ApiCall) -> Command {
        Command::Request {
            epoch: self.epoch,
            call,
        }
    }

    /// Clears the pending request if it matches `expected`.
    fn settle(&mut self, expected: Pending) -> bool {
        if self.pending != Some(expected) {
            warn!(expected = %expected, pending = ?self.pending, "Unexpected response ignored");
            return false;
        }
        self.pending = None;
        true
    }

    fn require_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<(), Rejection> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(Rejection::NotAllowed {
                action,
                phase: self.phase,
            })
        }
    }

    fn require_idle(&self) -> Result<(), Rejection> {
        match self.pending {
            Some(pending) => Err(Rejection::RequestPending { pending }),
            None => Ok(()),
        }
    }

    fn require_channel(&self) -> Result<(), Rejection> {
        if self.channel_open {
            Ok(())
        } else {
            Err(Rejection::ChannelClosed)
        }
    }

    /// Drops the session; responses still in flight become stale.
    fn reset_session(&mut self) {
        self.session = Session::new();
        self.pending = None;
        self.polling = false;
        self.epoch += 1;
        debug!(epoch = self.epoch, "Session reset");
    }

    /// Shows the lobby with a clean header.
    fn enter_lobby(&mut self) {
        self.reset_session();
        self.phase = Phase::InLobby;
        self.battlefield = None;
        self.banner = Banner::neutral();
        self.button.relabel(ActionLabel::CreateGame);
    }

    /// Returns to the lobby with an error in the header.
    fn fail_to_lobby(&mut self, text: impl Into<String>) {
        self.reset_session();
        self.phase = Phase::InLobby;
        self.battlefield = None;
        self.banner = Banner::error(text);
        self.button.relabel(ActionLabel::CreateGame);
    }

    /// Ends the game, keeping the battlefield on screen.
    fn stop_game(&mut self, banner: Banner) {
        self.reset_session();
        self.phase = Phase::Finished;
        self.banner = banner;
        self.button.relabel(ActionLabel::NewGame);
    }
}

fn your_move(side: Side) -> Banner {
    Banner::message(format!("Player \"{}\", your move", side))
}

fn wait_for_opponent(side: Side) -> Banner {
    Banner::message(format!("Player \"{}\", wait for the opponent's move", side))
}
