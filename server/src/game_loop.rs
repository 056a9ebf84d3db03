use crate::config::ServerConfig;
use crate::groups::GroupLoad;
use crate::protocol::{ClientMsg, SnapshotMsg, WelcomeMsg, PROTOCOL_VERSION};
use crate::state::GameState;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
pub enum GameCommand {
    ClientJoin {
        response: oneshot::Sender<(u32, WelcomeMsg)>,
    },
    ClientLeave {
        id: u32,
    },
    Input {
        connection_id: u32,
        msg: ClientMsg,
    },
}

/// Broadcasts from game loop to all clients
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Snapshot(SnapshotMsg),
}

/// Run the main game loop. Owns all game state.
///
/// `groups` resolves to the functional-group pool. It is polled alongside
/// client commands, so input (including Start Game) is handled while the
/// manifest is still loading.
pub async fn run_game_loop<G>(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
    groups: G,
) where
    G: Future<Output = GroupLoad>,
{
    let mut state = GameState::new(&server_config);
    let mut next_connection_id: u32 = 1;
    let mut connected: usize = 0;

    let dt = 1.0 / server_config.tick_rate_hz as f64;
    let tick_duration = Duration::from_secs_f64(dt);
    let broadcast_every_n = (server_config.tick_rate_hz / server_config.broadcast_rate_hz).max(1);
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tokio::pin!(groups);
    let mut groups_loaded = false;

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let changed = state.tick(dt);

                // Snapshots at the broadcast rate, or right away when the UI changed
                tick_count += 1;
                if changed || tick_count % broadcast_every_n as u64 == 0 {
                    let _ = broadcast_tx.send(GameBroadcast::Snapshot(state.snapshot()));
                }
            }

            load = &mut groups, if !groups_loaded => {
                groups_loaded = true;
                tracing::info!(
                    "Group pool ready: {} group(s), state {:?}",
                    load.pool.len(),
                    load.state
                );
                state.apply_group_load(load);
                let _ = broadcast_tx.send(GameBroadcast::Snapshot(state.snapshot()));
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::ClientJoin { response } => {
                        let id = next_connection_id;
                        next_connection_id = next_connection_id.wrapping_add(1).max(1);
                        let welcome = WelcomeMsg {
                            protocol_version: PROTOCOL_VERSION,
                            server_version: env!("CARGO_PKG_VERSION").to_string(),
                            connection_id: id,
                            table: *state.table.config(),
                            rules: *state.rules(),
                            snapshot: state.snapshot(),
                        };
                        if response.send((id, welcome)).is_ok() {
                            connected += 1;
                            tracing::info!("Connection {} joined ({} connected)", id, connected);
                        }
                    }
                    GameCommand::ClientLeave { id } => {
                        connected = connected.saturating_sub(1);
                        state.connection_left(id);
                        let _ = broadcast_tx.send(GameBroadcast::Snapshot(state.snapshot()));
                        tracing::info!("Connection {} left ({} connected)", id, connected);
                    }
                    GameCommand::Input { connection_id, msg } => {
                        state.handle_input(connection_id, msg);
                        let _ = broadcast_tx.send(GameBroadcast::Snapshot(state.snapshot()));
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}
