use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

use crate::game_loop::{GameBroadcast, GameCommand};
use crate::protocol::{ClientMsg, ServerMsg};

/// Largest client message accepted, in bytes
pub const MAX_MESSAGE_SIZE: usize = 1024;
/// Malformed messages tolerated before the connection is dropped
pub const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
    pub connection_semaphore: Arc<Semaphore>,
    pub max_inputs_per_sec: u32,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let Ok(permit) = app_state.connection_semaphore.clone().try_acquire_owned() else {
        tracing::warn!("Connection refused: server full");
        return (StatusCode::SERVICE_UNAVAILABLE, "Server full").into_response();
    };
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, permit))
}

/// Fixed one-second window counter.
struct RateLimiter {
    limit: u32,
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            window_start: Instant::now(),
            count: 0,
        }
    }

    fn allow(&mut self) -> bool {
        if self.window_start.elapsed() >= Duration::from_secs(1) {
            self.window_start = Instant::now();
            self.count = 0;
        }
        self.count += 1;
        self.count <= self.limit
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();

    // Join the game
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::ClientJoin { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send ClientJoin command");
        return;
    }

    let (my_id, welcome) = match resp_rx.await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Failed to receive welcome");
            return;
        }
    };

    tracing::info!("Connection {} opened", my_id);

    // Subscribe before sending the welcome so no snapshot falls in between
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    let welcome_sent = match serde_json::to_string(&ServerMsg::Welcome(welcome)) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            false
        }
    };

    let mut parse_errors: u32 = 0;
    let mut limiter = RateLimiter::new(app_state.max_inputs_per_sec);

    while welcome_sent {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_MESSAGE_SIZE {
                            tracing::warn!("Connection {} sent oversized message ({} bytes)", my_id, text.len());
                            break;
                        }
                        if !limiter.allow() {
                            tracing::warn!("Connection {} exceeded input rate limit", my_id);
                            break;
                        }
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(client_msg) => {
                                let cmd = GameCommand::Input { connection_id: my_id, msg: client_msg };
                                if app_state.game_tx.send(cmd).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                parse_errors += 1;
                                tracing::debug!("Connection {} sent bad message: {}", my_id, e);
                                if parse_errors >= MAX_PARSE_ERRORS {
                                    tracing::warn!("Connection {} dropped after {} parse errors", my_id, parse_errors);
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!("Connection {} sent binary frame", my_id);
                        break;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {} // Ignore ping/pong
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(GameBroadcast::Snapshot(snapshot)) => {
                        let json = match serde_json::to_string(&ServerMsg::Snapshot(snapshot)) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!("Failed to encode snapshot: {}", e);
                                continue;
                            }
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Snapshots are complete state, the next one catches up
                        tracing::warn!("Connection {} lagged by {} messages", my_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = sink.send(Message::Close(None)).await;

    // Cleanup on disconnect; releases any pointer capture this connection held
    let _ = app_state
        .game_tx
        .send(GameCommand::ClientLeave { id: my_id })
        .await;
    tracing::info!("Connection {} closed", my_id);
}
