//! Executes state machine commands and feeds results back.

use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::channel::{ChannelSignal, Registrar};
use crate::game::{
    ApiCall, Command, Completion, GameMachine, Input, Outcome, PollPolicy, Rejection, UserAction,
    await_opponent_move,
};
use crate::transport::{GameApi, Transport};

/// Couples a [`GameMachine`] with the network.
///
/// HTTP calls run as spawned tasks; their completions and lobby channel
/// signals are applied to the machine one at a time from whichever task owns
/// the driver.
pub struct SessionDriver<T, R> {
    machine: GameMachine,
    api: GameApi<T>,
    registrar: R,
    policy: PollPolicy,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    signals: mpsc::UnboundedReceiver<ChannelSignal>,
    signals_open: bool,
    in_flight: usize,
}

impl<T, R> SessionDriver<T, R>
where
    T: Transport + 'static,
    R: Registrar,
{
    /// Creates a driver over a connected lobby channel.
    #[instrument(skip_all)]
    pub fn new(
        api: GameApi<T>,
        registrar: R,
        signals: mpsc::UnboundedReceiver<ChannelSignal>,
        policy: PollPolicy,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let mut driver = Self {
            machine: GameMachine::new(),
            api,
            registrar,
            policy,
            completion_tx,
            completion_rx,
            signals,
            signals_open: true,
            in_flight: 0,
        };
        driver.apply(Input::ChannelConnected);
        info!("Session driver ready");
        driver
    }

    /// Current machine state, for rendering.
    pub fn machine(&self) -> &GameMachine {
        &self.machine
    }

    /// Number of spawned requests that have not reported back.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies a user action.
    #[instrument(skip(self))]
    pub fn act(&mut self, action: UserAction) -> Result<(), Rejection> {
        match self.machine.handle(Input::User(action)) {
            Ok(commands) => {
                self.execute(commands);
                Ok(())
            }
            Err(rejection) => {
                debug!(%rejection, "Action rejected");
                Err(rejection)
            }
        }
    }

    /// Applies every completion and lobby signal that is ready, without
    /// waiting. Returns how many inputs were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.on_completion(completion);
            applied += 1;
        }
        while self.signals_open {
            match self.signals.try_recv() {
                Ok(signal) => {
                    self.apply_signal(signal);
                    applied += 1;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => self.signals_open = false,
            }
        }
        applied
    }

    /// Waits for the next completion or lobby signal and applies it.
    ///
    /// Returns false once the lobby channel is gone and no request is
    /// outstanding that could still report back.
    pub async fn next_event(&mut self) -> bool {
        tokio::select! {
            Some(completion) = self.completion_rx.recv(), if self.in_flight > 0 => {
                self.on_completion(completion);
                true
            }
            signal = self.signals.recv(), if self.signals_open => {
                match signal {
                    Some(signal) => self.apply_signal(signal),
                    None => self.signals_open = false,
                }
                true
            }
            else => false,
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.apply(Input::Completed(completion));
    }

    fn apply_signal(&mut self, signal: ChannelSignal) {
        match signal {
            ChannelSignal::Event(event) => self.apply(Input::Lobby(event)),
            ChannelSignal::Closed { reason } => {
                self.signals_open = false;
                self.apply(Input::ChannelClosed { reason });
            }
        }
    }

    fn apply(&mut self, input: Input) {
        match self.machine.handle(input) {
            Ok(commands) => self.execute(commands),
            Err(rejection) => warn!(%rejection, "Input rejected"),
        }
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Register { id } => {
                    if let Err(e) = self.registrar.register(&id) {
                        warn!(error = %e, id = %id, "Register failed");
                        self.apply(Input::ChannelClosed {
                            reason: e.to_string(),
                        });
                    }
                }
                Command::Request { epoch, call } => self.spawn_request(epoch, call),
            }
        }
    }

    fn spawn_request(&mut self, epoch: u64, call: ApiCall) {
        self.in_flight += 1;
        let api = self.api.clone();
        let policy = self.policy.clone();
        let tx = self.completion_tx.clone();
        let span = info_span!("request", epoch, mutating = call.is_mutating());

        tokio::spawn(
            async move {
                let outcome = match call {
                    ApiCall::NewGame => Outcome::GameCreated(api.new_game().await),
                    ApiCall::GameReady { player, game } => {
                        Outcome::GameReady(api.game_ready(&player, &game).await)
                    }
                    ApiCall::SubmitMove { ids, index } => Outcome::MoveSubmitted {
                        index,
                        result: api.submit_move(&ids, index).await,
                    },
                    ApiCall::AwaitOpponent { ids } => {
                        Outcome::OpponentMoved(await_opponent_move(&api, &ids, &policy).await)
                    }
                    ApiCall::Surrender { ids } => Outcome::Surrendered(api.surrender(&ids).await),
                };
                if tx.send(Completion::new(epoch, outcome)).is_err() {
                    debug!("Driver dropped before the request finished");
                }
            }
            .instrument(span),
        );
    }
}
