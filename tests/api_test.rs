//! Game API requests and the opponent long-poll.

mod common;

use std::time::Duration;

use common::ScriptedTransport;
use reqwest::Method;
use serde_json::json;
use strictly_xo::{
    Endpoint, GameApi, OpponentUpdate, PollPolicy, SessionIds, Side, TransportError,
    await_opponent_move,
};

fn ids() -> SessionIds {
    SessionIds::new("g1".to_string(), "p1".to_string())
}

#[tokio::test]
async fn test_new_game_and_ready() {
    let transport = ScriptedTransport::new()
        .ok(json!({ "yourId": 17 }))
        .ok(json!({ "side": "o" }));
    let api = GameApi::new(transport.clone());

    let game = api.new_game().await.unwrap();
    assert_eq!(game.your_id, "17");

    let ready = api.game_ready("p1", "17").await.unwrap();
    assert_eq!(ready.side, Side::O);

    let requests = transport.requests();
    assert_eq!(*requests[0].endpoint(), Endpoint::NewGame);
    assert_eq!(*requests[0].method(), Method::POST);
    assert!(requests[0].ids().is_none());
    assert_eq!(
        *requests[1].body(),
        Some(json!({ "player": "p1", "game": "17" }))
    );
}

#[tokio::test]
async fn test_submit_move_sends_cell_as_string() {
    let transport = ScriptedTransport::new().ok(json!({}));
    let api = GameApi::new(transport.clone());

    let outcome = api.submit_move(&ids(), 5).await.unwrap();
    assert!(outcome.win.is_none());

    let request = &transport.requests()[0];
    assert_eq!(*request.method(), Method::POST);
    assert_eq!(*request.endpoint(), Endpoint::Move);
    assert_eq!(*request.body(), Some(json!({ "move": "5" })));
    assert_eq!(*request.ids(), Some(ids()));
}

#[tokio::test]
async fn test_surrender_uses_put() {
    let transport = ScriptedTransport::new().ok(json!({ "success": true }));
    let api = GameApi::new(transport.clone());

    assert!(api.surrender(&ids()).await.unwrap().success);
    assert_eq!(*transport.requests()[0].method(), Method::PUT);
}

#[tokio::test]
async fn test_poll_without_move_or_win_is_decode_error() {
    let api = GameApi::new(ScriptedTransport::new().ok(json!({})));
    assert!(matches!(
        api.poll_move(&ids()).await,
        Err(TransportError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_poll_retries_server_errors() {
    let transport = ScriptedTransport::new()
        .status(503, "")
        .status(500, "")
        .ok(json!({ "move": "7" }));
    let api = GameApi::new(transport.clone());

    let update = await_opponent_move(&api, &ids(), &PollPolicy::default())
        .await
        .unwrap();
    assert_eq!(update, OpponentUpdate::Moved(7));

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| *r.method() == Method::GET));
    assert!(requests.iter().all(|r| *r.ids() == Some(ids())));
}

#[tokio::test]
async fn test_poll_returns_client_errors_at_once() {
    let transport = ScriptedTransport::new()
        .status(404, r#"{"message":"Game not found"}"#)
        .ok(json!({ "move": 1 }));
    let api = GameApi::new(transport.clone());

    let err = await_opponent_move(&api, &ids(), &PollPolicy::default())
        .await
        .unwrap_err();
    assert_eq!(err.server_message().as_deref(), Some("Game not found"));
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test]
async fn test_poll_gives_up_after_max_attempts() {
    let transport = ScriptedTransport::new()
        .status(503, "")
        .status(503, "")
        .status(503, "");
    let api = GameApi::new(transport.clone());
    let policy = PollPolicy::new(Duration::from_millis(1), Some(2));

    let err = await_opponent_move(&api, &ids(), &policy).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_poll_reports_win() {
    let api = GameApi::new(ScriptedTransport::new().ok(json!({ "win": "o" })));
    let update = await_opponent_move(&api, &ids(), &PollPolicy::default())
        .await
        .unwrap();
    assert_eq!(update, OpponentUpdate::Won("o".to_string()));
}
