//! Integration tests for the pool trivia server.
//!
//! These tests start a real server instance and connect via WebSocket
//! to verify end-to-end behavior.

use futures_util::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use pooltrivia_server::app::build_router;
use pooltrivia_server::config::ServerConfig;
use pooltrivia_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use pooltrivia_server::groups::{load_groups, GroupLoad};
use pooltrivia_server::protocol::{ClientMsg, ServerMsg, SnapshotMsg, WelcomeMsg};
use pooltrivia_server::ws::AppState;
use pooltrivia_shared::phase::{GroupLoadState, Phase};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, oneshot, Semaphore};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tower::ServiceExt;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

fn web_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../web")
}

fn test_config() -> ServerConfig {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        rng_seed: 12345,
        web_root: web_root(),
        groups_path: web_root().join("functional_groups.json"),
        onboarding_path: std::env::temp_dir().join(format!(
            "pooltrivia_it_{}_{}/onboarding.json",
            std::process::id(),
            nanos
        )),
        max_connections: 100,
        ..Default::default()
    }
}

fn app_state(config: &ServerConfig) -> (AppState, mpsc::Receiver<GameCommand>) {
    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(256);
    let state = AppState {
        game_tx,
        broadcast_tx,
        connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
        max_inputs_per_sec: config.max_inputs_per_sec,
    };
    (state, game_rx)
}

/// Start a test server on a random available port and return the WebSocket URL.
async fn start_test_server_with<G>(config: ServerConfig, groups: G) -> String
where
    G: Future<Output = GroupLoad> + Send + 'static,
{
    let (state, game_rx) = app_state(&config);

    // Start game loop
    let broadcast_tx = state.broadcast_tx.clone();
    let game_config = config.clone();
    tokio::spawn(async move {
        run_game_loop(game_rx, broadcast_tx, game_config, groups).await;
    });

    let app = build_router(state, &config.web_root);
    let listener = TcpListener::bind(&config.listen_addr).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("ws://{}/ws", addr)
}

async fn start_test_server() -> String {
    let config = test_config();
    let groups = load_groups(config.groups_path.clone(), false);
    start_test_server_with(config, groups).await
}

/// Connect to the server and return the WebSocket stream.
async fn connect(url: &str) -> WsStream {
    let (ws, _) = connect_async(url).await.expect("Failed to connect");
    ws
}

/// Read the next text message and parse as ServerMsg.
async fn recv_msg(ws: &mut WsStream) -> ServerMsg {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(&text).expect("Failed to parse server message");
            }
            Some(Ok(_)) => continue, // Skip ping/pong
            Some(Err(e)) => panic!("WebSocket error: {}", e),
            None => panic!("WebSocket closed unexpectedly"),
        }
    }
}

async fn recv_welcome(ws: &mut WsStream) -> WelcomeMsg {
    match recv_msg(ws).await {
        ServerMsg::Welcome(w) => w,
        other => panic!("Expected Welcome, got {:?}", other),
    }
}

/// Wait (up to 3s) for a snapshot matching `accept`.
async fn wait_for_snapshot(ws: &mut WsStream, accept: impl Fn(&SnapshotMsg) -> bool) -> SnapshotMsg {
    let wait = async {
        loop {
            if let ServerMsg::Snapshot(s) = recv_msg(ws).await {
                if accept(&s) {
                    return s;
                }
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(3), wait)
        .await
        .expect("Timed out waiting for snapshot")
}

async fn send(ws: &mut WsStream, msg: &ClientMsg) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

async fn is_disconnected(ws: &mut WsStream) -> bool {
    for _ in 0..20 {
        match tokio::time::timeout(Duration::from_millis(100), ws.next()).await {
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => return true,
            Err(_) => {
                if ws.send(Message::Ping(vec![].into())).await.is_err() {
                    return true;
                }
            }
            _ => continue,
        }
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_connect_and_receive_welcome() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;

    let welcome = recv_welcome(&mut ws).await;
    assert_eq!(welcome.protocol_version, 1);
    assert!(welcome.connection_id > 0);
    assert_eq!(welcome.rules.max_humans, 8);
    assert!(welcome.snapshot.setup_visible);
    assert!(!welcome.snapshot.game_started);
    assert_eq!(welcome.snapshot.phase, Phase::QuestionActive);
}

#[tokio::test]
async fn test_start_game_hides_setup_modal() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;
    let _ = recv_welcome(&mut ws).await;

    // The shipped manifest may still be loading; wait until it is in.
    let _ = wait_for_snapshot(&mut ws, |s| s.group_load_state == GroupLoadState::Remote).await;

    send(
        &mut ws,
        &ClientMsg::StartGame {
            human_count: Some(1),
            npc_count: Some(1),
        },
    )
    .await;
    let snap = wait_for_snapshot(&mut ws, |s| s.game_started).await;
    assert!(!snap.setup_visible);
    assert_eq!(snap.players.len(), 2);
    assert_eq!(snap.current_player_id.as_deref(), Some("P1"));
    let question = snap.question.expect("question after start");
    assert!(question.choices_enabled);
    assert!(question.choices.len() >= 2);
}

#[tokio::test]
async fn test_start_is_handled_while_groups_are_loading() {
    let (load_tx, load_rx) = oneshot::channel::<GroupLoad>();
    let groups = async move { load_rx.await.unwrap_or_else(|_| GroupLoad::fallback()) };
    let url = start_test_server_with(test_config(), groups).await;
    let mut ws = connect(&url).await;
    let welcome = recv_welcome(&mut ws).await;
    assert_eq!(welcome.snapshot.group_load_state, GroupLoadState::Pending);

    send(
        &mut ws,
        &ClientMsg::StartGame {
            human_count: None,
            npc_count: None,
        },
    )
    .await;
    let started = wait_for_snapshot(&mut ws, |s| s.game_started).await;
    assert!(!started.setup_visible);
    assert!(started.question.is_none());

    load_tx.send(GroupLoad::fallback()).unwrap();
    let loaded = wait_for_snapshot(&mut ws, |s| s.question.is_some()).await;
    assert_eq!(loaded.group_load_state, GroupLoadState::Fallback);
    assert!(loaded.answer_meta.contains("Using local fallback prompts"));
    assert!(loaded.answer_text.contains("Using local fallback groups."));
}

#[tokio::test]
async fn test_locked_shot_does_not_move_balls() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;
    let _ = recv_welcome(&mut ws).await;
    let _ = wait_for_snapshot(&mut ws, |s| s.group_load_state == GroupLoadState::Remote).await;

    send(
        &mut ws,
        &ClientMsg::StartGame {
            human_count: Some(1),
            npc_count: Some(0),
        },
    )
    .await;
    let snap = wait_for_snapshot(&mut ws, |s| s.game_started).await;
    let cue = snap.balls.iter().find(|b| b.is_cue).unwrap().pos;

    send(&mut ws, &ClientMsg::PointerDown { pointer_id: 1, x: cue[0], y: cue[1] }).await;
    send(&mut ws, &ClientMsg::PointerMove { pointer_id: 1, x: cue[0] - 100.0, y: cue[1] }).await;
    send(&mut ws, &ClientMsg::PointerUp { pointer_id: 1 }).await;

    let snap = wait_for_snapshot(&mut ws, |s| s.answer_text == "Shot locked: answer first.").await;
    assert_eq!(snap.phase, Phase::QuestionActive);
    assert!(snap.aim.is_none());
    let still = snap.balls.iter().find(|b| b.is_cue).unwrap().pos;
    assert_eq!(still, cue);
}

#[tokio::test]
async fn test_multiple_clients_get_unique_ids() {
    let url = start_test_server().await;

    let mut ws1 = connect(&url).await;
    let mut ws2 = connect(&url).await;

    let id1 = recv_welcome(&mut ws1).await.connection_id;
    let id2 = recv_welcome(&mut ws2).await.connection_id;

    assert_ne!(id1, id2, "Each client should get a unique ID");
}

#[tokio::test]
async fn test_oversized_message_disconnects_client() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;
    let _ = recv_welcome(&mut ws).await;

    let huge_payload = "x".repeat(2000);
    let msg = format!(r#"{{"type":"answer","choice":"{}"}}"#, huge_payload);
    let _ = ws.send(Message::Text(msg.into())).await;

    assert!(
        is_disconnected(&mut ws).await,
        "Client should be disconnected after oversized message"
    );
}

#[tokio::test]
async fn test_parse_spam_disconnects_client() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;
    let _ = recv_welcome(&mut ws).await;

    for _ in 0..10 {
        if ws.send(Message::Text("not valid json".into())).await.is_err() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(
        is_disconnected(&mut ws).await,
        "Client should be disconnected after too many parse errors"
    );
}

#[tokio::test]
async fn test_rate_limiting_disconnects_abusive_client() {
    let config = ServerConfig {
        max_inputs_per_sec: 5,
        ..test_config()
    };
    let groups = std::future::ready(GroupLoad::fallback());
    let url = start_test_server_with(config, groups).await;
    let mut ws = connect(&url).await;
    let _ = recv_welcome(&mut ws).await;

    // Well over the per-second budget, sent in one burst
    for _ in 0..20 {
        let json = serde_json::to_string(&ClientMsg::NextGroup).unwrap();
        if ws.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }

    assert!(
        is_disconnected(&mut ws).await,
        "Client should be disconnected after exceeding the input rate"
    );
}

#[tokio::test]
async fn test_connection_limit_refuses_extra_clients() {
    let config = ServerConfig {
        max_connections: 1,
        ..test_config()
    };
    let groups = std::future::ready(GroupLoad::fallback());
    let url = start_test_server_with(config, groups).await;

    let mut first = connect(&url).await;
    let _ = recv_welcome(&mut first).await;
    assert!(connect_async(url.as_str()).await.is_err());
}

#[tokio::test]
async fn test_static_page_is_served() {
    let config = test_config();
    let (state, _game_rx) = app_state(&config);
    let app = build_router(state, &config.web_root);

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/index.html")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("id=\"setup-modal\""));
}

#[tokio::test]
async fn test_manifest_and_images_are_served() {
    let config = test_config();
    let (state, _game_rx) = app_state(&config);
    let app = build_router(state, &config.web_root);

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/functional_groups.json")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let manifest: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let image = manifest["groups"][0]["image"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri(format!("/{image}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}
