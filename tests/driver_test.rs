//! Session driver against a scripted server.

mod common;

use std::time::Duration;

use common::{RecordingRegistrar, ScriptedTransport};
use serde_json::json;
use strictly_xo::{
    ChannelSignal, Endpoint, GameApi, LobbyEvent, Phase, PollPolicy, SessionDriver, Side,
    Tone, UserAction,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

type Driver = SessionDriver<ScriptedTransport, RecordingRegistrar>;

async fn step(driver: &mut Driver) {
    let progressed = timeout(Duration::from_secs(5), driver.next_event())
        .await
        .expect("driver stalled");
    assert!(progressed);
}

#[tokio::test]
async fn test_full_exchange() {
    let transport = ScriptedTransport::new()
        .ok(json!({ "yourId": "g1" }))
        .ok(json!({ "side": "x" }))
        .ok(json!({}))
        .ok(json!({ "move": 12 }));
    let registrar = RecordingRegistrar::new();
    let (signal_tx, signals) = mpsc::unbounded_channel();

    let mut driver = SessionDriver::new(
        GameApi::new(transport.clone()),
        registrar.clone(),
        signals,
        PollPolicy::default(),
    );
    assert_eq!(*driver.machine().phase(), Phase::InLobby);

    driver.act(UserAction::CreateGame).unwrap();
    assert_eq!(driver.in_flight(), 1);
    step(&mut driver).await;
    assert_eq!(*driver.machine().phase(), Phase::AwaitingMatch);
    assert_eq!(registrar.ids(), vec!["g1".to_string()]);

    signal_tx
        .send(ChannelSignal::Event(LobbyEvent::StartGame {
            id: "p1".to_string(),
        }))
        .unwrap();
    step(&mut driver).await;
    step(&mut driver).await;
    assert_eq!(*driver.machine().phase(), Phase::MyTurn);
    assert_eq!(*driver.machine().session().player_side(), Some(Side::X));

    driver.act(UserAction::ClaimCell { index: 5 }).unwrap();
    step(&mut driver).await;
    assert_eq!(*driver.machine().phase(), Phase::OpponentTurn);
    step(&mut driver).await;
    assert_eq!(*driver.machine().phase(), Phase::MyTurn);
    assert_eq!(driver.in_flight(), 0);

    let field = driver.machine().battlefield().clone().unwrap();
    assert_eq!(*field.cell(5).unwrap().owner(), Some(Side::X));
    assert_eq!(*field.cell(12).unwrap().owner(), Some(Side::O));

    let endpoints: Vec<Endpoint> = transport
        .requests()
        .iter()
        .map(|r| *r.endpoint())
        .collect();
    assert_eq!(
        endpoints,
        vec![
            Endpoint::NewGame,
            Endpoint::GameReady,
            Endpoint::Move,
            Endpoint::Move
        ]
    );
}

#[tokio::test]
async fn test_lobby_events_reach_machine() {
    let (signal_tx, signals) = mpsc::unbounded_channel();
    let mut driver = SessionDriver::new(
        GameApi::new(ScriptedTransport::new()),
        RecordingRegistrar::new(),
        signals,
        PollPolicy::default(),
    );

    for id in ["a", "b"] {
        signal_tx
            .send(ChannelSignal::Event(LobbyEvent::Added { id: id.to_string() }))
            .unwrap();
    }
    assert_eq!(driver.pump(), 2);
    assert_eq!(driver.machine().lobby().len(), 2);
    assert_eq!(driver.pump(), 0);
}

#[tokio::test]
async fn test_failed_register_returns_to_lobby() {
    let transport = ScriptedTransport::new().ok(json!({ "yourId": "g1" }));
    let (_signal_tx, signals) = mpsc::unbounded_channel();
    let mut driver = SessionDriver::new(
        GameApi::new(transport),
        RecordingRegistrar::closed(),
        signals,
        PollPolicy::default(),
    );

    driver.act(UserAction::CreateGame).unwrap();
    step(&mut driver).await;
    assert_eq!(*driver.machine().phase(), Phase::InLobby);
    assert_eq!(*driver.machine().banner().tone(), Tone::Error);
    assert!(!*driver.machine().channel_open());
}

#[tokio::test]
async fn test_next_event_ends_with_channel() {
    let (signal_tx, signals) = mpsc::unbounded_channel();
    let mut driver = SessionDriver::new(
        GameApi::new(ScriptedTransport::new()),
        RecordingRegistrar::new(),
        signals,
        PollPolicy::default(),
    );

    signal_tx
        .send(ChannelSignal::Closed {
            reason: "bye".to_string(),
        })
        .unwrap();
    drop(signal_tx);

    step(&mut driver).await;
    assert!(!*driver.machine().channel_open());
    assert!(!driver.next_event().await);
}
