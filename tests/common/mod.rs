//! Shared fixtures: a scripted transport and a recording registrar.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use strictly_xo::{
    ApiCall, ApiRequest, ChannelError, Command, Completion, GameMachine, HttpFailure, Input,
    Outcome, Registrar, Transport, TransportError,
};

/// Answers requests from a queue and remembers what was asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a success body.
    pub fn ok(self, body: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queues an HTTP failure.
    pub fn status(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(http_error(status, body)));
        self
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("script exhausted")))
    }
}

/// Registrar that records ids, or refuses them all when `closed`.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistrar {
    ids: Arc<Mutex<Vec<String>>>,
    closed: bool,
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Self::default()
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }
}

impl Registrar for RecordingRegistrar {
    fn register(&self, id: &str) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.ids.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// An HTTP failure with the given status and raw body.
pub fn http_error(status: u16, body: &str) -> TransportError {
    let reason = match status {
        404 => "Not Found",
        410 => "Gone",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    };
    HttpFailure::new(status, reason.to_string(), body.to_string()).into()
}

/// A machine that has seen the lobby channel connect.
pub fn lobby_machine() -> GameMachine {
    let mut machine = GameMachine::new();
    let commands = machine.handle(Input::ChannelConnected).unwrap();
    assert!(commands.is_empty());
    machine
}

/// Unwraps the single request a transition produced.
pub fn single_request(commands: Vec<Command>) -> (u64, ApiCall) {
    match commands.as_slice() {
        [Command::Request { epoch, call }] => (*epoch, call.clone()),
        other => panic!("expected one request, got {:?}", other),
    }
}

/// Feeds a completion for `epoch`.
pub fn complete(machine: &mut GameMachine, epoch: u64, outcome: Outcome) -> Vec<Command> {
    machine
        .handle(Input::Completed(Completion::new(epoch, outcome)))
        .unwrap()
}
